use maud::{html, Markup};

/// Light/dark toggle; the click handler lives in static/app.js and
/// persists the choice to localStorage.
pub fn theme_toggle() -> Markup {
    html! {
        button id="theme-toggle" class="button is-small" type="button"
               aria-label="Toggle color theme" title="Toggle color theme" {
            span class="icon is-small" { (moon_icon()) }
        }
    }
}

fn moon_icon() -> Markup {
    html! {
        svg xmlns="http://www.w3.org/2000/svg" width="14" height="14" viewBox="0 0 24 24"
            fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" {
            path d="M21 12.79A9 9 0 1 1 11.21 3 7 7 0 0 0 21 12.79z" {}
        }
    }
}
