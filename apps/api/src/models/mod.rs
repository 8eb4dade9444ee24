pub mod brand;
pub mod media;
pub mod post;
pub mod profile;
