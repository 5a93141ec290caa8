#[allow(non_snake_case)]
pub mod Adducts;
#[allow(non_snake_case)]
pub mod Chemistry;
#[allow(non_snake_case)]
pub mod Pathways;
#[allow(non_snake_case)]
pub mod Store;
#[allow(non_snake_case)]
pub mod Utils;
pub mod cancel;
pub mod cli;
pub mod error;
pub mod services;
pub mod settings;
