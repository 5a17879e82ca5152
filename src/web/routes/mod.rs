pub mod auth_routes;
pub mod book_routes;
pub mod film_routes;
