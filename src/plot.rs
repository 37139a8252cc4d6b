use strum::{Display, EnumIter, IntoEnumIterator};

/// Kind of map to render, as offered in the plot-type menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum PlotType {
    #[strum(to_string = "Scatter Plot")]
    Scatter,
    #[strum(to_string = "Density Plot")]
    Density,
    #[strum(to_string = "Lines Plot")]
    Lines,
    #[strum(to_string = "All")]
    All,
}

impl PlotType {
    /// Plot types that produce a single figure.
    pub const CONCRETE: [PlotType; 3] = [PlotType::Scatter, PlotType::Density, PlotType::Lines];

    /// Menu code used at the prompt.
    pub fn code(self) -> char {
        match self {
            PlotType::Scatter => '1',
            PlotType::Density => '2',
            PlotType::Lines => '3',
            PlotType::All => 'A',
        }
    }

    /// Maps a menu code to its plot type. Anything unrecognized is a scatter plot.
    pub fn from_code(code: &str) -> Self {
        PlotType::iter()
            .find(|plot| {
                let mut chars = code.chars();
                chars.next() == Some(plot.code()) && chars.next().is_none()
            })
            .unwrap_or(PlotType::Scatter)
    }

    /// File name fragment, e.g. `scatter_plot`.
    pub fn slug(self) -> String {
        self.to_string().to_lowercase().replace(' ', "_")
    }

    pub fn default_file_name(self) -> String {
        format!("export_{}.html", self.slug())
    }
}
