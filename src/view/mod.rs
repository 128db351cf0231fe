// Pure renderers: MallState -> UI description
//
// Renderers return plain values. The retained layer (Dashboard, the
// browser dashboard, the console) swaps the previous value out wholesale,
// so rendering twice never duplicates anything. Text is carried as plain
// strings and is never interpreted as markup by any sink.

mod mall;
mod parking;
mod transcript;

pub use mall::{
    render_mall, render_summary, ChartBackend, ChartBoard, ChartHost, ChartSlot, MallCharts,
    MallSummary, PieChart, Slice, SummaryRow, AGE_CHART_TITLE, AGE_PALETTE, GENDER_CHART_TITLE,
    GENDER_PALETTE,
};
pub use parking::{render_parking, ParkingView, SlotCard, SlotStyle, ToggleControl};
pub use transcript::{render_transcript, TranscriptLine};
