use log::info;
use reportkit::{
    CsvData, ExcelSettings, LogNotifier, PdfSettings, Table, export_to_excel, export_to_pdf,
    read_csv, serialize_for_clipboard, std_dev,
};
use std::env;
use std::fs;
use std::time::Instant;

const USAGE: &str = "Usage: reportkit <command> <file.csv> [args]

Commands:
  rows <csv>               print the parsed rows as JSON
  copy <csv>               print the tab separated clipboard text
  html <csv>               print the clipboard markup
  xlsx <csv> [out]         export to Excel (legacy .xls if xlsx fails)
  pdf <csv> [out]          write the print document
  stdev <csv> <column>     standard deviation of a numeric column";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let start = Instant::now();
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("{}", USAGE);
        return Ok(());
    }

    let command = args[1].as_str();
    let data = read_csv(&args[2])?;
    let rows = &data.rows;
    let out = args.get(3);

    match command {
        "rows" => println!("{}", serde_json::to_string_pretty(rows)?),
        "copy" => println!("{}", serialize_for_clipboard(&to_table(&data)).text),
        "html" => println!("{}", serialize_for_clipboard(&to_table(&data)).html),
        "xlsx" => {
            let settings = ExcelSettings::default();
            let export = export_to_excel(&to_table(&data), &settings, &LogNotifier);
            let path = out.cloned().unwrap_or(export.file_name);
            fs::write(&path, &export.bytes)?;
            info!("wrote {} ({:?})", path, export.format);
        }
        "pdf" => {
            let settings = PdfSettings::default();
            let document = export_to_pdf(&to_table(&data), &settings, &LogNotifier);
            let path = out.cloned().unwrap_or_else(|| "report.html".to_string());
            fs::write(&path, document.html)?;
            info!("wrote {}", path);
        }
        "stdev" => {
            let Some(column) = out else {
                eprintln!("{}", USAGE);
                return Ok(());
            };
            let values: Vec<f64> = rows
                .iter()
                .filter_map(|row| row.get(column))
                .filter_map(|value| value.parse().ok())
                .collect();
            println!("{:.1}", std_dev(&values));
        }
        _ => {
            eprintln!("Unknown command: {}\n\n{}", command, USAGE);
            return Ok(());
        }
    }

    info!("done in {:.1} seconds", start.elapsed().as_secs_f64());
    Ok(())
}

fn to_table(data: &CsvData) -> Table {
    Table::from_rows(&data.headers, &data.rows)
}
