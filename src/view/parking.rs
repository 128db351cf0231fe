use crate::state::MallState;

/// Visual class of a slot card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStyle {
    /// Status is exactly `free`
    Free,
    /// Any other status, including ones this client does not know
    Occupied,
}

/// Toggle button attached to a slot card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleControl {
    pub slot: String,
    pub label: &'static str,
}

/// One visual unit of the parking grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCard {
    pub id: String,
    pub title: String,
    pub status: String,
    pub style: SlotStyle,
    pub toggle: ToggleControl,
}

/// Parking grid description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParkingView {
    pub slots: Vec<SlotCard>,
    /// False until a snapshot or parking update has been received
    pub has_data: bool,
}

impl ParkingView {
    pub fn free_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.style == SlotStyle::Free)
            .count()
    }
}

/// Render the parking grid in slot declaration order.
pub fn render_parking(state: &MallState) -> ParkingView {
    let Some(parking) = state.parking.as_ref() else {
        return ParkingView::default();
    };

    let slots = parking
        .iter()
        .map(|(id, status)| SlotCard {
            id: id.to_string(),
            title: format!("Slot {}", id),
            status: status.as_str().to_string(),
            style: if status.is_free() {
                SlotStyle::Free
            } else {
                SlotStyle::Occupied
            },
            toggle: ToggleControl {
                slot: id.to_string(),
                label: "Toggle",
            },
        })
        .collect();

    ParkingView {
        slots,
        has_data: true,
    }
}
