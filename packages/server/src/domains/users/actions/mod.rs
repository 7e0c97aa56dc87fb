mod register_user;

pub use register_user::register_user;
