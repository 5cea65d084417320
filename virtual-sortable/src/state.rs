/// A serializable snapshot of the viewport as the windowing engine sees it.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportState {
    pub offset: u64,
    pub client_size: u32,
    /// Total scrollable length (front + rendered + behind).
    pub scroll_size: u64,
    pub reached_top: bool,
    pub reached_bottom: bool,
}

impl ViewportState {
    /// Largest offset that still fills the viewport.
    pub fn max_offset(&self) -> u64 {
        self.scroll_size.saturating_sub(self.client_size as u64)
    }
}
