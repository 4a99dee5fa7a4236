//! JavaScript interop for measuring the preview

use anyhow::{Context, Result, anyhow};
use dioxus::prelude::document;
use mdpdf_core::capture::Viewport;

/// Scroll size of an element, in CSS pixels
pub async fn measure_scroll_size(element_id: &str) -> Result<Viewport> {
    let js = format!(
        r#"
        var el = document.getElementById('{}');
        if (!el) return null;
        return [el.scrollWidth, el.scrollHeight];
        "#,
        element_id
    );

    let value = document::eval(&js)
        .await
        .map_err(|e| anyhow!("failed to measure #{element_id}: {e:?}"))?;

    let dimension = |index: usize| {
        value
            .get(index)
            .and_then(|v| v.as_f64())
            .with_context(|| format!("#{element_id} not found in the page"))
    };
    let width = dimension(0_usize)?;
    let height = dimension(1_usize)?;

    Ok(Viewport::new(width as f32, height as f32))
}
