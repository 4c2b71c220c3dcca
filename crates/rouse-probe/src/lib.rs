/// In-page probe that locates and clicks the wake button without the driver.
/// Queries the stable test id first, then scans all buttons for the resume
/// prompt text. Returns `true` when a button was found and clicked, `false`
/// otherwise; never throws on absence.
pub const PROBE_JS: &str = include_str!("probe.js");

/// Script-forced click used when the native click is rejected (element
/// obstructed or not interactable). Expects the element reference as
/// `arguments[0]`, scrolls it to the viewport center and clicks it.
pub const FORCE_CLICK_JS: &str = include_str!("force_click.js");
