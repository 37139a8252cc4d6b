use std::{
    io::{BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::{
    config::Config,
    console::Console,
    error,
    export::Exporter,
    figure::create_map,
    plot::PlotType,
    records::{self, Record},
};

/// Answers supplied up front instead of at the prompts.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub input: Option<String>,
    pub output: Option<String>,
    pub delimiter: Option<String>,
    pub plot: Option<String>,
    pub no_show: bool,
}

/// Runs one session and returns the files it wrote.
pub fn run<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    options: &Options,
    config: &Config,
) -> Result<Vec<PathBuf>> {
    console.clear()?;
    console.print_header()?;
    console.print_format_info()?;

    let path = PathBuf::from(console.csv_filename(options.input.as_deref())?);
    records::validate(&path)?;

    let delimiter = console.delimiter(options.delimiter.as_deref())?;
    let table = records::load(&path, delimiter)?;

    let plot = console.plot_type(options.plot.as_deref())?;
    let exporter = Exporter::new(&config.html)?;

    if plot == PlotType::All {
        let results = export_all(&table, &exporter, config)?;
        for path in results.iter().flatten() {
            console.println(format_args!("Plot saved as {}", path.display()))?;
        }
        let written = results.into_iter().collect::<error::Result<Vec<_>>>()?;
        return Ok(written);
    }

    let figure = create_map(&table, plot, &config.map)?;
    let name = console.html_filename(options.output.as_deref(), &plot.default_file_name())?;
    let path = config.output_dir.join(name);

    exporter.write_html(&figure, &path)?;
    console.println(format_args!("Plot saved as {}", path.display()))?;

    if config.show && !options.no_show {
        // the export is already on disk
        if let Err(e) = exporter.show(&path) {
            warn!(path = %path.display(), "{e}");
        }
    }

    Ok(vec![path])
}

/// Builds and exports every concrete plot type on a worker pool.
///
/// Every task runs to completion; the result for each plot type is returned in
/// [`PlotType::CONCRETE`] order. Only a pool that cannot be built fails the call.
pub fn export_all(
    table: &[Record],
    exporter: &Exporter,
    config: &Config,
) -> Result<Vec<error::Result<PathBuf>>> {
    let threads = config.threads();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("export-{i}"))
        .build()
        .context("Failed to build worker pool")?;
    info!(threads, "exporting all plot types");

    let results = pool.install(|| {
        PlotType::CONCRETE
            .par_iter()
            .map(|&plot| {
                let figure = create_map(table, plot, &config.map)?;
                exporter.export_plot(&figure, &config.output_dir, &plot.slug())
            })
            .collect::<Vec<_>>()
    });

    Ok(results)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::Value;

    use crate::{config::MapSettings, error::Error};

    use super::*;

    const HEADER: &str = "latitude,longitude,id,userId,lastSeenAt,speed,direction,source";

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("plotlyimex-app-{}", std::process::id()))
            .join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn config(dir: &Path) -> Config {
        Config {
            output_dir: dir.to_owned(),
            show: false,
            ..Config::default()
        }
    }

    fn write_input(dir: &Path) -> String {
        let path = dir.join("import.csv");
        fs::write(&path, format!("{HEADER}\n1.0,2.0,a1,u1,2024-01-01,5,90,gps\n")).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn session(input: &str) -> Console<&[u8], Vec<u8>> {
        Console::new(input.as_bytes(), Vec::new())
    }

    fn html_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".html"))
            .collect();
        names.sort();
        names
    }

    fn embedded_figure(html: &str) -> Value {
        let start = html.find("var figure = ").unwrap() + "var figure = ".len();
        let end = start + html[start..].find(";\n").unwrap();
        serde_json::from_str(&html[start..end].replace("<\\/", "</")).unwrap()
    }

    #[test]
    fn scatter_scenario() {
        let dir = scratch("scatter");
        let options = Options {
            input: Some(write_input(&dir)),
            ..Options::default()
        };
        // delimiter, plot type, output name
        let mut console = session(",\n1\n\n");

        let written = run(&mut console, &options, &config(&dir)).unwrap();
        assert_eq!(written, vec![dir.join("export_scatter_plot.html")]);
        assert_eq!(html_files(&dir), ["export_scatter_plot.html"]);

        let html = fs::read_to_string(&written[0]).unwrap();
        let figure = embedded_figure(&html);
        assert_eq!(figure["data"][0]["type"], "scattermapbox");
        assert_eq!(figure["data"][0]["lat"][0], 1.0);
        assert_eq!(figure["data"][0]["lon"][0], 2.0);
        assert_eq!(figure["data"][0]["hovertext"][0], "a1");

        let output = String::from_utf8(console.into_output()).unwrap();
        assert!(output.contains(&format!("Plot saved as {}", written[0].display())));
    }

    #[test]
    fn custom_output_name() {
        let dir = scratch("named");
        let options = Options {
            input: Some(write_input(&dir)),
            output: Some("globe".to_owned()),
            plot: Some("3".to_owned()),
            delimiter: Some(",".to_owned()),
            ..Options::default()
        };
        let written = run(&mut session(""), &options, &config(&dir)).unwrap();
        assert_eq!(written, vec![dir.join("globe.html")]);
        let figure = embedded_figure(&fs::read_to_string(&written[0]).unwrap());
        assert_eq!(figure["layout"]["geo"]["projection"]["type"], "orthographic");
    }

    #[test]
    fn all_scenario() {
        let dir = scratch("all");
        let options = Options {
            input: Some(write_input(&dir)),
            ..Options::default()
        };
        let mut console = session(",\nA\n");
        let written = run(&mut console, &options, &config(&dir)).unwrap();
        assert_eq!(written.len(), 3);
        assert_eq!(
            html_files(&dir),
            [
                "export_density_plot.html",
                "export_lines_plot.html",
                "export_scatter_plot.html",
            ]
        );
        for path in &written {
            assert!(fs::metadata(path).unwrap().len() > 0);
        }

        let output = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(output.matches("Plot saved as ").count(), 3);
        for path in &written {
            assert!(output.contains(&format!("Plot saved as {}", path.display())));
        }
    }

    #[test]
    fn all_with_single_worker() {
        let dir = scratch("one-thread");
        let table = vec![Record {
            latitude: Some(1.0),
            longitude: Some(2.0),
            id: "a1".to_owned(),
            user_id: "u1".to_owned(),
            last_seen_at: "2024-01-01".to_owned(),
            speed: "5".to_owned(),
            direction: "90".to_owned(),
            source: "gps".to_owned(),
        }];
        let config = Config {
            threads: std::num::NonZeroUsize::new(1),
            ..config(&dir)
        };
        let exporter = Exporter::new(&config.html).unwrap();
        let written = export_all(&table, &exporter, &config)
            .unwrap()
            .into_iter()
            .collect::<error::Result<Vec<_>>>()
            .unwrap();
        assert_eq!(
            written,
            PlotType::CONCRETE.map(|plot| dir.join(plot.default_file_name()))
        );
    }

    #[test]
    fn all_reports_export_failure() {
        let dir = scratch("all-fails");
        let config = config(&dir.join("missing"));
        let exporter = Exporter::new(&config.html).unwrap();
        let results = export_all(&[], &exporter, &config).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results
            .iter()
            .all(|result| matches!(result, Err(Error::Export(_)))));
    }

    #[test]
    fn all_keeps_going_after_a_failure() {
        let dir = scratch("all-partial");
        // a directory in the way of the lines export
        fs::create_dir(dir.join("export_lines_plot.html")).unwrap();
        let options = Options {
            input: Some(write_input(&dir)),
            delimiter: Some(",".to_owned()),
            plot: Some("A".to_owned()),
            ..Options::default()
        };
        let config = Config {
            threads: std::num::NonZeroUsize::new(1),
            ..config(&dir)
        };
        let mut console = session("");

        let err = run(&mut console, &options, &config).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Export(_))));
        assert!(dir.join("export_scatter_plot.html").is_file());
        assert!(dir.join("export_density_plot.html").is_file());

        let output = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(output.matches("Plot saved as ").count(), 2);
        assert!(!output.contains("export_lines_plot.html"));
    }

    #[test]
    fn missing_viewer_still_writes() {
        let dir = scratch("viewer");
        let options = Options {
            input: Some(write_input(&dir)),
            delimiter: Some(",".to_owned()),
            plot: Some("2".to_owned()),
            output: Some(String::new()),
            ..Options::default()
        };
        let mut config = config(&dir);
        config.show = true;
        config.html.viewer = Some("/nonexistent/plotlyimex-viewer".to_owned());

        let written = run(&mut session(""), &options, &config).unwrap();
        assert_eq!(written, vec![dir.join("export_density_plot.html")]);
        assert!(written[0].is_file());
        assert_eq!(html_files(&dir), ["export_density_plot.html"]);
    }

    #[test]
    fn missing_file_scenario() {
        let dir = scratch("missing");
        let options = Options {
            input: Some(dir.join("missing.csv").to_string_lossy().into_owned()),
            ..Options::default()
        };
        let err = run(&mut session(",\n1\n\n"), &options, &config(&dir)).unwrap_err();
        let err = err.downcast_ref::<Error>().unwrap();
        assert!(matches!(err, Error::FileNotFound(_)));
        assert!(err.to_string().contains("missing.csv' could not be found"));
        assert!(html_files(&dir).is_empty());
    }

    #[test]
    fn wrong_extension() {
        let dir = scratch("extension");
        let path = dir.join("points.csv.txt");
        fs::write(&path, HEADER).unwrap();
        // the prompt appends .csv, so only an override can reach the check
        let mut console = session("");
        let name = console
            .csv_filename(Some(path.to_string_lossy().as_ref()))
            .unwrap();
        assert!(name.ends_with(".csv.txt.csv"));

        let err = records::validate(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn missing_columns_reported() {
        let dir = scratch("columns");
        let path = dir.join("import.csv");
        fs::write(&path, "latitude,longitude,id\n1,2,a\n").unwrap();
        let options = Options {
            input: Some(path.to_string_lossy().into_owned()),
            ..Options::default()
        };
        let err = run(&mut session("\n1\n\n"), &options, &config(&dir)).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Load(_))));
        assert!(html_files(&dir).is_empty());
    }
}
