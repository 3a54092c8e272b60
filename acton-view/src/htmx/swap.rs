//! Values for the `HX-Reswap` response header.
//!
//! See <https://htmx.org/attributes/hx-swap/>.

use std::fmt;
use std::time::Duration;

use axum::http::HeaderValue;
use axum_htmx::SwapOption;

/// Top or bottom of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Top of the element
    Top,
    /// Bottom of the element
    Bottom,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Viewport {
    selector: Option<String>,
    edge: Edge,
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.selector {
            Some(selector) => write!(f, "{}:{}", selector, self.edge),
            None => write!(f, "{}", self.edge),
        }
    }
}

/// [`SwapOption`] plus the `hx-swap` modifiers.
///
/// ```rust
/// use acton_view::htmx::{Edge, Swap, SwapOption};
/// use std::time::Duration;
///
/// let swap = Swap::new(SwapOption::OuterHtml)
///     .transition(true)
///     .swap_delay(Duration::from_millis(100))
///     .scroll(Edge::Top);
/// assert_eq!(swap.to_string(), "outerHTML transition:true swap:100ms scroll:top");
/// ```
#[derive(Debug, Clone)]
pub struct Swap {
    style: SwapOption,
    transition: Option<bool>,
    swap_delay: Option<Duration>,
    settle_delay: Option<Duration>,
    scroll: Option<Viewport>,
    show: Option<Viewport>,
    focus_scroll: Option<bool>,
}

impl Swap {
    /// Swap with the given style and no modifiers
    #[must_use]
    pub fn new(style: SwapOption) -> Self {
        Self {
            style,
            transition: None,
            swap_delay: None,
            settle_delay: None,
            scroll: None,
            show: None,
            focus_scroll: None,
        }
    }

    /// Use the View Transitions API
    #[must_use]
    pub fn transition(mut self, enabled: bool) -> Self {
        self.transition = Some(enabled);
        self
    }

    /// Delay between receiving the response and swapping
    #[must_use]
    pub fn swap_delay(mut self, delay: Duration) -> Self {
        self.swap_delay = Some(delay);
        self
    }

    /// Delay between swapping and settling
    #[must_use]
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = Some(delay);
        self
    }

    /// Scroll the target to an edge
    #[must_use]
    pub fn scroll(mut self, edge: Edge) -> Self {
        self.scroll = Some(Viewport { selector: None, edge });
        self
    }

    /// Scroll the element matching `selector` to an edge
    #[must_use]
    pub fn scroll_to(mut self, selector: impl Into<String>, edge: Edge) -> Self {
        self.scroll = Some(Viewport {
            selector: Some(selector.into()),
            edge,
        });
        self
    }

    /// Show the target's edge in the viewport
    #[must_use]
    pub fn show(mut self, edge: Edge) -> Self {
        self.show = Some(Viewport { selector: None, edge });
        self
    }

    /// Show the edge of the element matching `selector` in the viewport
    #[must_use]
    pub fn show_element(mut self, selector: impl Into<String>, edge: Edge) -> Self {
        self.show = Some(Viewport {
            selector: Some(selector.into()),
            edge,
        });
        self
    }

    /// Scroll to the focused element after the swap
    #[must_use]
    pub fn focus_scroll(mut self, enabled: bool) -> Self {
        self.focus_scroll = Some(enabled);
        self
    }
}

impl Default for Swap {
    fn default() -> Self {
        Self::new(SwapOption::InnerHtml)
    }
}

impl From<SwapOption> for Swap {
    fn from(style: SwapOption) -> Self {
        Self::new(style)
    }
}

impl fmt::Display for Swap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let style = HeaderValue::from(self.style.clone());
        f.write_str(style.to_str().map_err(|_| fmt::Error)?)?;
        if let Some(transition) = self.transition {
            write!(f, " transition:{transition}")?;
        }
        if let Some(delay) = self.swap_delay {
            write!(f, " swap:{}ms", delay.as_millis())?;
        }
        if let Some(delay) = self.settle_delay {
            write!(f, " settle:{}ms", delay.as_millis())?;
        }
        if let Some(scroll) = &self.scroll {
            write!(f, " scroll:{scroll}")?;
        }
        if let Some(show) = &self.show {
            write!(f, " show:{show}")?;
        }
        if let Some(focus) = self.focus_scroll {
            write!(f, " focus-scroll:{focus}")?;
        }
        Ok(())
    }
}
