use maud::{html, Markup};

use crate::templates::layouts::CurrentPage;

/// Responsive navigation bar with HTMX-powered navigation
pub fn navbar(current_page: CurrentPage) -> Markup {
    html! {
        nav class="navbar mb-4" role="navigation" aria-label="main navigation" {
            div class="navbar-brand" {
                // Hamburger menu for mobile
                a role="button" class="navbar-burger" aria-label="menu"
                  aria-expanded="false" data-target="navbarMenu" {
                    span aria-hidden="true" {}
                    span aria-hidden="true" {}
                    span aria-hidden="true" {}
                }
            }

            div id="navbarMenu" class="navbar-menu" {
                div class="navbar-start" {
                    a href="/"
                      class=(nav_item_class(current_page, CurrentPage::Dashboard))
                      hx-get="/"
                      hx-target="#main-content"
                      hx-push-url="true"
                      hx-swap="innerHTML" {
                        span class="icon-text" {
                            span class="icon" { (dashboard_icon()) }
                            span { "Dashboard" }
                        }
                    }
                }
            }
        }
    }
}

fn nav_item_class(current: CurrentPage, page: CurrentPage) -> &'static str {
    if current == page {
        "navbar-item is-active"
    } else {
        "navbar-item"
    }
}

fn dashboard_icon() -> Markup {
    html! {
        svg xmlns="http://www.w3.org/2000/svg" width="16" height="16" viewBox="0 0 24 24"
            fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" {
            rect x="3" y="3" width="7" height="7" {}
            rect x="14" y="3" width="7" height="7" {}
            rect x="14" y="14" width="7" height="7" {}
            rect x="3" y="14" width="7" height="7" {}
        }
    }
}
