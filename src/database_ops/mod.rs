pub mod accounts;
pub mod owned_games;
