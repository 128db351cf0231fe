use crate::state::{Distribution, MallState};
use anyhow::Result;
use serde_json::Value;
use tracing::{debug, error};

pub const AGE_CHART_TITLE: &str = "Crowd Age Distribution";
pub const GENDER_CHART_TITLE: &str = "Gender Distribution";

pub const AGE_PALETTE: [&str; 5] = ["#FF6384", "#36A2EB", "#FFCE56", "#4BC0C0", "#9966FF"];
pub const GENDER_PALETTE: [&str; 2] = ["#36A2EB", "#FF6384"];

/// One slice of a proportional breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    /// Fraction of the chart total in `0.0..=1.0` (0 when the total is 0)
    pub share: f64,
    pub color: &'static str,
}

/// Pie-style breakdown handed to the chart sink.
#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub title: &'static str,
    pub slices: Vec<Slice>,
}

impl PieChart {
    fn from_distribution(title: &'static str, dist: &Distribution, palette: &[&'static str]) -> Self {
        let total: f64 = dist.values().filter(|v| v.is_finite() && **v > 0.0).sum();
        let slices = dist
            .iter()
            .enumerate()
            .map(|(i, (label, value))| Slice {
                label: label.to_string(),
                value: *value,
                share: if total > 0.0 && value.is_finite() && *value > 0.0 {
                    value / total
                } else {
                    0.0
                },
                color: palette[i % palette.len()],
            })
            .collect();
        Self { title, slices }
    }

    pub fn total(&self) -> f64 {
        self.slices.iter().map(|s| s.value).sum()
    }
}

/// Charts of the mall analytics view.
#[derive(Debug, Clone, PartialEq)]
pub struct MallCharts {
    pub age: PieChart,
    pub gender: Option<PieChart>,
}

/// Render the analytics charts.
///
/// Without an age distribution nothing is rendered, even when genders are
/// present: the gender chart only ever accompanies the age chart.
pub fn render_mall(state: &MallState) -> Option<MallCharts> {
    let ages = state.ages()?;
    Some(MallCharts {
        age: PieChart::from_distribution(AGE_CHART_TITLE, ages, &AGE_PALETTE),
        gender: state
            .genders()
            .map(|g| PieChart::from_distribution(GENDER_CHART_TITLE, g, &GENDER_PALETTE)),
    })
}

/// Chart placement on the analytics view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartSlot {
    Age,
    Gender,
}

/// Opaque chart rendering sink.
///
/// Every `create` allocates a live chart instance that must be handed back
/// to `destroy` before its slot is drawn again.
pub trait ChartBackend {
    type Handle;

    fn create(&mut self, slot: ChartSlot, chart: &PieChart) -> Result<Self::Handle>;

    fn destroy(&mut self, handle: Self::Handle);
}

/// Owns the live chart instances of one analytics view.
pub struct ChartHost<B: ChartBackend> {
    backend: B,
    age: Option<B::Handle>,
    gender: Option<B::Handle>,
}

impl<B: ChartBackend> ChartHost<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            age: None,
            gender: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Show freshly rendered charts.
    ///
    /// `None` is a no-op: no backend call at all. A gender chart from an
    /// earlier render stays up when the new render carries none.
    pub fn show(&mut self, charts: Option<&MallCharts>) {
        let Some(charts) = charts else {
            debug!("No age data yet");
            return;
        };

        Self::replace(&mut self.backend, &mut self.age, ChartSlot::Age, &charts.age);
        if let Some(gender) = &charts.gender {
            Self::replace(&mut self.backend, &mut self.gender, ChartSlot::Gender, gender);
        }
    }

    fn replace(backend: &mut B, live: &mut Option<B::Handle>, slot: ChartSlot, chart: &PieChart) {
        if let Some(handle) = live.take() {
            backend.destroy(handle);
        }
        match backend.create(slot, chart) {
            Ok(handle) => *live = Some(handle),
            Err(e) => error!(error = %e, slot = ?slot, "Failed to create chart"),
        }
    }
}

/// In-memory chart sink used by text-based dashboards: keeps the chart
/// currently shown in each slot.
#[derive(Debug, Default)]
pub struct ChartBoard {
    age: Option<PieChart>,
    gender: Option<PieChart>,
}

impl ChartBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chart(&self, slot: ChartSlot) -> Option<&PieChart> {
        match slot {
            ChartSlot::Age => self.age.as_ref(),
            ChartSlot::Gender => self.gender.as_ref(),
        }
    }
}

impl ChartBackend for ChartBoard {
    type Handle = ChartSlot;

    fn create(&mut self, slot: ChartSlot, chart: &PieChart) -> Result<ChartSlot> {
        let target = match slot {
            ChartSlot::Age => &mut self.age,
            ChartSlot::Gender => &mut self.gender,
        };
        *target = Some(chart.clone());
        Ok(slot)
    }

    fn destroy(&mut self, handle: ChartSlot) {
        match handle {
            ChartSlot::Age => self.age = None,
            ChartSlot::Gender => self.gender = None,
        }
    }
}

/// Row of the admin crowd summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub label: String,
    pub value: String,
}

/// Admin crowd summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MallSummary {
    pub rows: Vec<SummaryRow>,
    pub has_data: bool,
}

/// Render the crowd counters and any extra analytics keys.
pub fn render_summary(state: &MallState) -> MallSummary {
    let Some(mall) = state.mall.as_ref() else {
        return MallSummary::default();
    };

    let mut rows = Vec::new();
    let mut push = |label: &str, value: String| {
        rows.push(SummaryRow {
            label: label.to_string(),
            value,
        })
    };

    if let Some(n) = mall.entered {
        push("Total entered", n.to_string());
    }
    if let Some(n) = mall.inside {
        push("Currently inside", n.to_string());
    }
    if let Some(n) = mall.exited {
        push("Exited", n.to_string());
    }
    for (key, value) in &mall.extra {
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        push(key.as_str(), text);
    }

    MallSummary {
        rows,
        has_data: true,
    }
}
