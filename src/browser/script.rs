//! JavaScript snippets evaluated in the page
//!
//! Text matching follows the usual `text=` selector semantics: whitespace is
//! collapsed, comparison is a case-insensitive substring match, and only the
//! deepest elements containing the text count (a wrapper whose child already
//! matches is skipped).

/// Defines `__gcFindByText(needle) -> Element[]`
const FIND_BY_TEXT: &str = r#"
function __gcNorm(el) {
  return (el.innerText || el.textContent || '').replace(/\s+/g, ' ').trim().toLowerCase();
}
function __gcFindByText(needle) {
  const want = needle.replace(/\s+/g, ' ').trim().toLowerCase();
  if (!document.body) return [];
  const skip = new Set(['SCRIPT', 'STYLE', 'NOSCRIPT', 'TEMPLATE', 'HEAD']);
  return Array.from(document.body.querySelectorAll('*')).filter((el) => {
    if (skip.has(el.tagName)) return false;
    if (!__gcNorm(el).includes(want)) return false;
    return !Array.from(el.children).some((c) => !skip.has(c.tagName) && __gcNorm(c).includes(want));
  });
}
"#;

/// Quote a Rust string as a JavaScript string literal
pub fn js_string(value: &str) -> String {
    // JSON string literals are valid JS string literals
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Number of deepest elements whose visible text contains `text`
pub fn count_by_text(text: &str) -> String {
    format!(
        "(() => {{ {} return __gcFindByText({}).length; }})()",
        FIND_BY_TEXT,
        js_string(text)
    )
}

/// Click the first element containing `text`; evaluates to whether one existed
pub fn click_by_text(text: &str) -> String {
    format!(
        "(() => {{ {} const hits = __gcFindByText({}); \
         if (hits.length === 0) return false; \
         hits[0].scrollIntoView({{ block: 'center' }}); hits[0].click(); return true; }})()",
        FIND_BY_TEXT,
        js_string(text)
    )
}

/// Number of elements matching a CSS selector
pub fn count_selector(selector: &str) -> String {
    format!(
        "(() => document.querySelectorAll({}).length)()",
        js_string(selector)
    )
}

/// Click the first element matching a CSS selector
pub fn click_selector(selector: &str) -> String {
    format!(
        "(() => {{ const el = document.querySelector({}); \
         if (!el) return false; el.scrollIntoView({{ block: 'center' }}); el.click(); return true; }})()",
        js_string(selector)
    )
}

/// Inner HTML of the first match, or empty string
pub fn inner_html(selector: &str) -> String {
    format!(
        "(() => {{ const el = document.querySelector({}); return el ? el.innerHTML : ''; }})()",
        js_string(selector)
    )
}

/// Visible text of `<body>`
pub const BODY_TEXT: &str = "(() => document.body ? document.body.innerText : '')()";

/// Whether the document finished loading
pub const READY_STATE_COMPLETE: &str = "(() => document.readyState === 'complete')()";

/// Number of resource timing entries so far, used to detect network quiet
pub const RESOURCE_COUNT: &str = "(() => performance.getEntriesByType('resource').length)()";

/// HTTP status of the main document, 0 when the browser doesn't expose it
pub const NAVIGATION_STATUS: &str = "(() => { \
    const nav = performance.getEntriesByType('navigation')[0]; \
    return nav && nav.responseStatus ? nav.responseStatus : 0; })()";
