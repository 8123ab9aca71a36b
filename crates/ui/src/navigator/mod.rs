pub mod view;

pub use view::NavigatorView;
