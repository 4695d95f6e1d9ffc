pub mod follows;
pub mod likes;
pub mod medias;
pub mod tweets;
pub mod users;
