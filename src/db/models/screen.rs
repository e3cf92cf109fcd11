//! Screen geometry as stored in the screen catalog.

/// Geometry of one monitor, without the per-snapshot `id`.
///
/// Two screens are the same catalog entry when all six fields are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedScreen {
    pub primary: bool,
    pub name: String,
    pub res_x: i64,
    pub res_y: i64,
    pub off_x: i64,
    pub off_y: i64,
}

impl NormalizedScreen {
    pub const NO_SCREEN_NAME: &'static str = "no screen connected";

    /// Stand-in geometry used when the mouse is not on any listed screen.
    pub fn no_screen() -> Self {
        Self {
            primary: false,
            name: Self::NO_SCREEN_NAME.to_string(),
            res_x: 0,
            res_y: 0,
            off_x: 0,
            off_y: 0,
        }
    }

    pub fn is_no_screen(&self) -> bool {
        *self == Self::no_screen()
    }

    /// Canonical encoding used as the catalog's unique key.
    pub fn canonical_key(&self) -> String {
        // The name is written as a JSON string literal so it cannot forge a separator.
        format!(
            "{}|{}|{}x{}{:+}{:+}",
            self.primary,
            serde_json::Value::String(self.name.clone()),
            self.res_x,
            self.res_y,
            self.off_x,
            self.off_y
        )
    }
}
