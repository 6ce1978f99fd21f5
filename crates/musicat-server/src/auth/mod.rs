pub mod capabilities;
pub mod jwt;
pub mod middleware;
