use anyhow::{Context, Result};

use crate::db::helpers::required_int;
use crate::db::models::NormalizedScreen;
use crate::snapshot::{FlexInt, RawSnapshot, ScreenInfo};

fn index_of(value: &FlexInt) -> Option<i64> {
    value.to_i64().ok().flatten()
}

pub fn normalize_screen(screen: &ScreenInfo) -> Result<NormalizedScreen> {
    Ok(NormalizedScreen {
        primary: screen.primary,
        name: screen.name.clone(),
        res_x: required_int(&screen.res_x, "res_x")?,
        res_y: required_int(&screen.res_y, "res_y")?,
        off_x: required_int(&screen.off_x, "off_x")?,
        off_y: required_int(&screen.off_y, "off_y")?,
    })
}

/// Geometry of the screen the mouse was on.
///
/// A missing or stale mouse screen index is normal and yields the
/// "no screen connected" geometry. Only a matched screen with unusable
/// geometry is an error.
pub fn resolve_focus_screen(snapshot: &RawSnapshot) -> Result<NormalizedScreen> {
    let Some(wanted) = snapshot.mouse.screen.as_ref().and_then(index_of) else {
        return Ok(NormalizedScreen::no_screen());
    };

    match snapshot
        .screens
        .iter()
        .find(|screen| index_of(&screen.id) == Some(wanted))
    {
        Some(screen) => normalize_screen(screen)
            .with_context(|| format!("screen {wanted} ({}) has invalid geometry", screen.name)),
        None => Ok(NormalizedScreen::no_screen()),
    }
}
