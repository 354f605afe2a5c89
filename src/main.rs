use anyhow::{bail, Result};
use env_logger::Env;

use sqlite_query_engine::database::Database;
use sqlite_query_engine::format;
use sqlite_query_engine::sql::executor::run_query;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = std::env::args().collect::<Vec<_>>();
    match args.len() {
        0 | 1 => bail!("Missing <database path> and <command>"),
        2 => bail!("Missing <command>"),
        _ => {}
    }

    let db_path = &args[1];
    let command = &args[2];

    let mut database = Database::open(db_path)?;

    match command.as_str() {
        ".dbinfo" => {
            println!("database page size: {}", database.page_size());
            println!("number of tables: {}", database.schema_cell_count()?);
        }
        ".tables" => {
            println!("{}", database.user_table_names()?);
        }
        sql_text => {
            let rows = run_query(database.reader_mut(), sql_text)?;
            format::print_rows(&rows)?;
        }
    }

    Ok(())
}
