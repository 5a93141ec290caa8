use crate::Adducts::adduct_search::AdductSearchParams;
use crate::Pathways::pathway_search::pretty_print_paths;
use crate::Utils::load_from_file::read_text;
use crate::cancel::CancelToken;
use crate::services::{FORM_FORMAT, MineServices, pretty_print_reports};
use std::io::{self, Write};

pub fn run_interactive_menu(services: &MineServices) -> io::Result<()> {
    loop {
        show_main_menu()?;
        let choice = get_user_input()?;

        match choice.trim() {
            "1" => single_peak_menu(services)?,
            "2" => batch_menu(services)?,
            "3" => pathway_menu(services)?,
            "4" => list_adducts(services),
            "5" => list_databases(services),
            "0" => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
    Ok(())
}
/* colors
Blue (\x1b[34m) - Welcome header text

Yellow (\x1b[33m) - Menu options

Cyan (\x1b[36m) - prompts

Red (\x1b[31m) - errors

Reset (\x1b[0m) - Returns to normal color after each colored section
*/
fn show_main_menu() -> io::Result<()> {
    println!(
        "\x1b[34m\n Welcome to MineSearch: mass-adduct and pathway search\n
    over predicted metabolic networks \n \x1b[0m"
    );
    println!("\x1b[33m1. Adduct search, single peak\x1b[0m");
    println!("\x1b[33m2. Adduct search, peak file\x1b[0m");
    println!("\x1b[33m3. Pathway search\x1b[0m");
    println!("\x1b[33m4. List adducts\x1b[0m");
    println!("\x1b[33m5. List databases and models\x1b[0m");
    println!("\x1b[33m0. Exit\x1b[0m");
    print!("\x1b[36mEnter your choice: \x1b[0m");
    io::stdout().flush()
}

fn get_user_input() -> io::Result<String> {
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input)
}

fn ask(label: &str) -> io::Result<String> {
    print!("\x1b[36m{}: \x1b[0m", label);
    io::stdout().flush()?;
    Ok(get_user_input()?.trim().to_string())
}

// empty answer or unparsable text gives `default`
fn ask_or<T: std::str::FromStr>(label: &str, default: T) -> io::Result<T> {
    let answer = ask(label)?;
    Ok(answer.parse().unwrap_or(default))
}

fn ask_flag(label: &str) -> io::Result<bool> {
    let answer = ask(&format!("{} [y/N]", label))?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}

fn report_error(e: impl std::fmt::Display) {
    println!("\x1b[31mError: {}\x1b[0m", e);
}

fn ask_params() -> io::Result<AdductSearchParams> {
    let tolerance = ask_or("Tolerance (default 0.005)", 0.005)?;
    let ppm = ask_flag("Tolerance in ppm?")?;
    let charge = ask_or("Charge (0 = both polarities)", 0)?;
    let adducts: Vec<String> = ask("Adducts, comma separated (empty = all)")?
        .split(',')
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    let models: Vec<String> = ask("Models, comma separated (empty = any)")?
        .split(',')
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    let include_halogens = !ask_flag("Exclude halogenated formulas?")?;
    Ok(AdductSearchParams::new(tolerance, ppm)
        .charge(charge)
        .adducts(adducts)
        .models(models)
        .include_halogens(include_halogens)
        .max_concurrency(0))
}

fn single_peak_menu(services: &MineServices) -> io::Result<()> {
    let db = ask("Database")?;
    let mz: f64 = match ask("m/z")?.parse() {
        Ok(mz) => mz,
        Err(e) => {
            report_error(e);
            return Ok(());
        }
    };
    let params = ask_params()?;
    match services.search_adducts_single_peak(&db, mz, &params, &CancelToken::new()) {
        Ok(hits) if hits.is_empty() => println!("No candidates."),
        Ok(hits) => {
            for hit in hits {
                println!(
                    "\x1b[33m{}\x1b[0m {}: {}",
                    hit.adduct,
                    hit.formula,
                    hit.isomers.join(", ")
                );
            }
        }
        Err(e) => report_error(e),
    }
    Ok(())
}

fn batch_menu(services: &MineServices) -> io::Result<()> {
    let db = ask("Database")?;
    let file = ask("Peak file (one m/z per line)")?;
    let text = match read_text(&file) {
        Ok(text) => text,
        Err(e) => {
            report_error(e);
            return Ok(());
        }
    };
    let params = ask_params()?;
    match services.search_adducts_batch(&db, &text, FORM_FORMAT, &params, &CancelToken::new()) {
        Ok(reports) => {
            pretty_print_reports(&reports);
            let annotated = reports.iter().filter(|r| r.total_hits > 0).count();
            let native = reports.iter().filter(|r| r.native_hit).count();
            println!(
                "{} of {} peaks annotated, {} with a native compound",
                annotated,
                reports.len(),
                native
            );
        }
        Err(e) => report_error(e),
    }
    Ok(())
}

fn pathway_menu(services: &MineServices) -> io::Result<()> {
    let db = ask("Database")?;
    let start = ask("Start compound id")?;
    let end = ask("End compound id")?;
    let max_length = ask_or("Maximum number of reactions (default 3)", 3usize)?;
    let all_paths = ask_flag("All paths instead of the shortest?")?;
    match services.find_pathway(&db, &start, &end, max_length, all_paths, &CancelToken::new()) {
        Ok(paths) if paths.is_empty() => println!("No path within {} reactions.", max_length),
        Ok(paths) => pretty_print_paths(&paths),
        Err(e) => report_error(e),
    }
    Ok(())
}

fn list_adducts(services: &MineServices) {
    let (positive, negative) = services.get_adducts();
    println!("\x1b[33mPositive mode:\x1b[0m {}", positive.join(", "));
    println!("\x1b[33mNegative mode:\x1b[0m {}", negative.join(", "));
}

fn list_databases(services: &MineServices) {
    let names = services.database_names();
    if names.is_empty() {
        println!("No database configured, add one to mine_config.json.");
    }
    for db in names {
        match services.get_models(&db) {
            Ok(models) => {
                println!("\x1b[33m{}\x1b[0m: {} model(s)", db, models.len());
                for (id, name) in models {
                    println!("    {} {}", id, name);
                }
            }
            Err(e) => report_error(e),
        }
    }
}
