//! report::tables — fit tables, fit classification and CSV export.
//!
//! Purpose
//! -------
//! Hold per-item and per-subject fit results as labelled rows, classify
//! defined values against an acceptance band, and export the rows as CSV.
//!
//! Key behaviors
//! -------------
//! - A row whose statistic is undefined keeps the degenerate
//!   [`RaschError`] instead of a number, and exports as empty cells.
//! - [`FitBand`] maps a mean-square value to [`FitClass`]: below the band
//!   is overfit (too predictable), above it underfit (too noisy).
//!
//! Conventions
//! -----------
//! - Rows are keyed by the unique item or subject id; the label is for
//!   display only and may repeat (two students can share a username).
//! - CSV columns are `id,label,infit,outfit`, one row per item or subject,
//!   in matrix order.
use std::io::Write;

use csv::Writer;

use crate::rasch::{
    errors::{RaschError, RaschResult},
    fit::FitStatistics,
};

/// Acceptance band for mean-square fit values.
///
/// Default: `[0.7, 1.3]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitBand {
    pub lower: f64,
    pub upper: f64,
}

impl FitBand {
    /// # Errors
    /// [`RaschError::InvalidFitBand`] unless `0 <= lower < upper` with both
    /// ends finite.
    pub fn new(lower: f64, upper: f64) -> RaschResult<Self> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(RaschError::InvalidFitBand {
                lower,
                upper,
                reason: "Band ends must be finite.",
            });
        }
        if lower < 0.0 || lower >= upper {
            return Err(RaschError::InvalidFitBand {
                lower,
                upper,
                reason: "Band must satisfy 0 <= lower < upper.",
            });
        }
        Ok(Self { lower, upper })
    }

    /// Classify a mean-square value; band ends count as acceptable.
    pub fn classify(&self, value: f64) -> FitClass {
        if value < self.lower {
            FitClass::Overfit
        } else if value > self.upper {
            FitClass::Underfit
        } else {
            FitClass::Acceptable
        }
    }
}

impl Default for FitBand {
    fn default() -> Self {
        Self { lower: 0.7, upper: 1.3 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FitClass {
    Overfit,
    Acceptable,
    Underfit,
}

/// Which axis a fit table summarizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitTableKind {
    Item,
    Person,
}

/// Fit result for one item or subject.
#[derive(Debug, Clone, PartialEq)]
pub struct FitRow {
    pub id: String,
    pub label: String,
    pub fit: Result<FitStatistics, RaschError>,
}

impl FitRow {
    /// `(infit class, outfit class)`, or `None` when the fit is undefined.
    pub fn classify(&self, band: &FitBand) -> Option<(FitClass, FitClass)> {
        self.fit.as_ref().ok().map(|f| (band.classify(f.infit()), band.classify(f.outfit())))
    }
}

/// Fit rows for every item or every subject of an analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct FitTable {
    kind: FitTableKind,
    rows: Vec<FitRow>,
}

impl FitTable {
    pub fn new(kind: FitTableKind, rows: Vec<FitRow>) -> Self {
        Self { kind, rows }
    }

    pub fn kind(&self) -> FitTableKind {
        self.kind
    }

    pub fn rows(&self) -> &[FitRow] {
        &self.rows
    }

    pub fn get(&self, id: &str) -> Option<&FitRow> {
        self.rows.iter().find(|row| row.id == id)
    }

    /// `(id, statistics)` of rows whose fit is defined.
    pub fn defined(&self) -> impl Iterator<Item = (&str, &FitStatistics)> {
        self.rows.iter().filter_map(|row| Some((row.id.as_str(), row.fit.as_ref().ok()?)))
    }

    /// Ids of rows where infit or outfit falls outside `band`.
    pub fn misfitting(&self, band: &FitBand) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|row| {
                row.classify(band).is_some_and(|(infit, outfit)| {
                    infit != FitClass::Acceptable || outfit != FitClass::Acceptable
                })
            })
            .map(|row| row.id.as_str())
            .collect()
    }

    /// Write `id,label,infit,outfit` rows; undefined statistics are empty.
    ///
    /// # Errors
    /// [`RaschError::Export`] if writing fails.
    pub fn write_csv<W: Write>(&self, sink: W) -> RaschResult<()> {
        let mut writer = Writer::from_writer(sink);
        writer.write_record(["id", "label", "infit", "outfit"])?;
        for row in &self.rows {
            let (infit, outfit) = match &row.fit {
                Ok(fit) => (fit.infit().to_string(), fit.outfit().to_string()),
                Err(_) => (String::new(), String::new()),
            };
            writer.write_record([
                row.id.as_str(),
                row.label.as_str(),
                infit.as_str(),
                outfit.as_str(),
            ])?;
        }
        writer.flush().map_err(|err| RaschError::Export { text: err.to_string() })
    }

    /// The CSV export as a string.
    pub fn to_csv_string(&self) -> RaschResult<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer).map_err(|err| RaschError::Export { text: err.to_string() })
    }
}
