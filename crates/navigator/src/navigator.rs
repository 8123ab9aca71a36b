use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geometry::{Bounds, Direction, Position};
use crate::panel::{SafetyPanel, SafetyReport};
use crate::safety::SafetyTier;
use crate::street::{STREET_COUNT, Street, StreetName};

pub const START_POSITION: Position = Position::new(185, 162);
pub const MOVE_STEP: i32 = 15;
/// The marker never leaves this rectangle, even where streets extend past it.
pub const MAP_BOUNDS: Bounds = Bounds::new(10, 790, 10, 590);
/// Size of the drawn map area. Streets span all of it.
pub const MAP_WIDTH: i32 = 800;
pub const MAP_HEIGHT: i32 = 600;
/// The marker's text label sits this far below its anchor.
pub const LABEL_OFFSET_Y: i32 = 5;

/// Result of revealing one street's safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reveal {
    pub street: StreetName,
    pub tier: SafetyTier,
    /// True only the first time the street is entered since the last reset.
    pub first_visit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Destination off the map or off every street; nothing changed.
    Blocked,
    Moved {
        position: Position,
        street: StreetName,
        /// Present when the move entered a different street.
        reveal: Option<Reveal>,
    },
}

pub struct StreetSafetyNavigator<R = StdRng> {
    rng: R,
    streets: [Street; STREET_COUNT],
    position: Position,
    current_street: Option<StreetName>,
    visited: BTreeSet<StreetName>,
    panel: SafetyPanel,
}

impl StreetSafetyNavigator<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for StreetSafetyNavigator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> StreetSafetyNavigator<R> {
    /// Builds the navigator with freshly randomized tiers and reveals the street
    /// under the start position.
    pub fn with_rng(mut rng: R) -> Self {
        let streets = StreetName::ALL.map(|name| Street {
            name,
            safety: SafetyTier::random(&mut rng),
        });

        let mut navigator = Self {
            rng,
            streets,
            position: START_POSITION,
            current_street: None,
            visited: BTreeSet::new(),
            panel: SafetyPanel::Prompt,
        };
        navigator.check_current_street();
        navigator
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn label_position(&self) -> Position {
        Position::new(self.position.x, self.position.y + LABEL_OFFSET_Y)
    }

    pub fn current_street(&self) -> Option<StreetName> {
        self.current_street
    }

    pub fn visited(&self) -> &BTreeSet<StreetName> {
        &self.visited
    }

    pub fn is_visited(&self, name: StreetName) -> bool {
        self.visited.contains(&name)
    }

    pub fn panel(&self) -> &SafetyPanel {
        &self.panel
    }

    pub fn streets(&self) -> &[Street] {
        &self.streets
    }

    pub fn street(&self, name: StreetName) -> &Street {
        // `streets` is built from `StreetName::ALL`, so the discriminant is the index.
        &self.streets[name as usize]
    }

    /// Tier a street is colored with on the map, once it has been visited.
    pub fn marking(&self, name: StreetName) -> Option<SafetyTier> {
        self.is_visited(name).then(|| self.street(name).safety)
    }

    /// First street in table order whose rectangle contains `position`.
    pub fn street_at(&self, position: Position) -> Option<StreetName> {
        StreetName::ALL
            .into_iter()
            .find(|name| name.bounds().contains(position))
    }

    pub fn move_character(&mut self, direction: Direction) -> MoveOutcome {
        let candidate = self.position.offset(direction, MOVE_STEP);

        let Some(street) = self.street_at(candidate) else {
            tracing::trace!(?direction, x = candidate.x, y = candidate.y, "move off street ignored");
            return MoveOutcome::Blocked;
        };
        if !MAP_BOUNDS.contains(candidate) {
            tracing::trace!(?direction, x = candidate.x, y = candidate.y, "move off map ignored");
            return MoveOutcome::Blocked;
        }

        self.position = candidate;

        let reveal = if self.current_street != Some(street) {
            self.current_street = Some(street);
            Some(self.reveal_street_safety(street))
        } else {
            None
        };

        MoveOutcome::Moved {
            position: candidate,
            street,
            reveal,
        }
    }

    /// Marks the street visited on first entry and always refreshes the panel.
    pub fn reveal_street_safety(&mut self, name: StreetName) -> Reveal {
        let tier = self.street(name).safety;
        let first_visit = self.visited.insert(name);

        if first_visit {
            tracing::debug!(street = %name, tier = %tier, "street revealed");
        }

        self.panel = SafetyPanel::Report(SafetyReport { street: name, tier });

        Reveal {
            street: name,
            tier,
            first_visit,
        }
    }

    /// Back to the start with new tiers, no visited streets and the initial
    /// prompt, then reveals the start street again.
    pub fn reset_character(&mut self) -> Option<Reveal> {
        self.position = START_POSITION;
        self.current_street = None;
        self.visited.clear();

        for street in &mut self.streets {
            street.safety = SafetyTier::random(&mut self.rng);
        }

        self.panel = SafetyPanel::Prompt;
        tracing::info!("navigator reset");

        self.check_current_street()
    }

    fn check_current_street(&mut self) -> Option<Reveal> {
        let street = self.street_at(self.position)?;
        self.current_street = Some(street);
        Some(self.reveal_street_safety(street))
    }
}
