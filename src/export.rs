//! Writes figures as standalone HTML documents.

use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{bail, Context};
use tracing::{debug, info};

use crate::{
    config::HtmlSettings,
    error::{Error, Result},
    figure::Figure,
};

/// Renders figures into HTML pages that load plotly.js either from a URL or
/// inlined from a local copy.
#[derive(Debug, Clone)]
pub struct Exporter {
    script: Script,
    viewer: Option<String>,
}

#[derive(Debug, Clone)]
enum Script {
    Url(String),
    Inline(String),
}

impl Exporter {
    pub fn new(settings: &HtmlSettings) -> Result<Self> {
        let script = match &settings.plotly_js_path {
            Some(path) => {
                let source = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read plotly.js from {}", path.display()))
                    .map_err(Error::Export)?;
                Script::Inline(source)
            }
            None => Script::Url(settings.plotly_js.clone()),
        };
        Ok(Self {
            script,
            viewer: settings.viewer.clone(),
        })
    }

    pub fn render(&self, figure: &Figure) -> Result<String> {
        let json = figure
            .to_json()
            .context("Failed to serialize figure")
            .map_err(Error::Export)?;
        // keep record values from closing the script element
        let json = json.replace("</", "<\\/");

        let div = format!("plot-{}", figure.plot.slug().replace('_', "-"));
        let script = match &self.script {
            Script::Url(url) => format!(r#"<script charset="utf-8" src="{url}"></script>"#),
            Script::Inline(source) => format!(r#"<script type="text/javascript">{source}</script>"#),
        };
        let (width, height) = (&figure.layout["width"], &figure.layout["height"]);

        Ok(format!(
            r#"<html>
<head><meta charset="utf-8" /><title>{title}</title></head>
<body>
    <div>
        {script}
        <div id="{div}" class="plotly-graph-div" style="height:{height}px; width:{width}px;"></div>
        <script type="text/javascript">
            (function () {{
                var figure = {json};
                Plotly.newPlot("{div}", figure.data, figure.layout, {{"responsive": true}});
            }})();
        </script>
    </div>
</body>
</html>
"#,
            title = figure.plot,
        ))
    }

    pub fn write_html(&self, figure: &Figure, path: &Path) -> Result<PathBuf> {
        let html = self.render(figure)?;
        fs::write(path, html)
            .with_context(|| format!("Failed to write {}", path.display()))
            .map_err(Error::Export)?;
        info!(path = %path.display(), plot = %figure.plot, "wrote figure");
        Ok(path.to_owned())
    }

    /// Writes `export_<name>.html` into `dir`.
    pub fn export_plot(&self, figure: &Figure, dir: &Path, name: &str) -> Result<PathBuf> {
        let path = dir.join(format!("export_{name}.html"));
        self.write_html(figure, &path)
    }

    /// Opens an exported page in the configured viewer, or the platform's
    /// default browser, blocking until the opener returns.
    pub fn show(&self, path: &Path) -> Result<()> {
        open(self.viewer.as_deref(), path).map_err(Error::Export)
    }
}

fn open(viewer: Option<&str>, path: &Path) -> anyhow::Result<()> {
    let mut command = match viewer {
        Some(viewer) => Command::new(viewer),
        None if cfg!(target_os = "windows") => {
            let mut command = Command::new("cmd");
            command.args(["/C", "start", ""]);
            command
        }
        None if cfg!(target_os = "macos") => Command::new("open"),
        None => Command::new("xdg-open"),
    };
    command.arg(path);
    debug!(?command, "opening viewer");

    let status = command
        .status()
        .with_context(|| format!("Failed to open {}", path.display()))?;
    if !status.success() {
        bail!("viewer exited with {status}");
    }
    Ok(())
}
