/// reading adduct lists, peak files and JSON store documents, with the offending line logged on parse errors
pub mod load_from_file;
