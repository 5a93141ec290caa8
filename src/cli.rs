/// interactive terminal menu over the search services
pub mod cli_main;
