//! Storefront views and the guards in front of them.
//!
//! Everything here is a pure function of a [`Session`] snapshot.

use std::fmt;

use crate::models::ProductId;
use crate::session::{Session, SessionEvent};

/// A view of the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    SignUp,
    Product(ProductId),
    Cart,
    Favorites,
    Checkout,
    OrderSuccess,
    Orders,
    Admin,
    About,
    Contact,
    Shipping,
    Returns,
    Faq,
    Privacy,
}

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Admin,
}

impl Route {
    /// Match a path such as `/product/12`. Trailing slashes and a query
    /// string are ignored.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_end_matches('/');

        let route = match path {
            "" => Route::Home,
            "/login" => Route::Login,
            "/signup" => Route::SignUp,
            "/cart" => Route::Cart,
            "/favorites" => Route::Favorites,
            "/checkout" => Route::Checkout,
            "/order-success" => Route::OrderSuccess,
            "/orders" => Route::Orders,
            "/admin" => Route::Admin,
            "/about" => Route::About,
            "/contact" => Route::Contact,
            "/shipping" => Route::Shipping,
            "/returns" => Route::Returns,
            "/faq" => Route::Faq,
            "/privacy" => Route::Privacy,
            other => {
                let id = other.strip_prefix("/product/")?;
                return id.parse().ok().map(Route::Product);
            }
        };
        Some(route)
    }

    pub fn path(&self) -> String {
        let path = match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::SignUp => "/signup",
            Route::Product(id) => return format!("/product/{id}"),
            Route::Cart => "/cart",
            Route::Favorites => "/favorites",
            Route::Checkout => "/checkout",
            Route::OrderSuccess => "/order-success",
            Route::Orders => "/orders",
            Route::Admin => "/admin",
            Route::About => "/about",
            Route::Contact => "/contact",
            Route::Shipping => "/shipping",
            Route::Returns => "/returns",
            Route::Faq => "/faq",
            Route::Privacy => "/privacy",
        };
        path.to_owned()
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Cart
            | Route::Favorites
            | Route::Checkout
            | Route::OrderSuccess
            | Route::Orders => Access::Authenticated,
            Route::Admin => Access::Admin,
            _ => Access::Public,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Allow signed-in users; everyone else goes to login.
pub fn require_authenticated(session: &Session) -> Result<(), Route> {
    if session.is_authenticated() {
        Ok(())
    } else {
        Err(Route::Login)
    }
}

/// Allow administrators. Signed-out users go to login, other users home.
pub fn require_admin(session: &Session) -> Result<(), Route> {
    require_authenticated(session)?;
    if session.is_admin() {
        Ok(())
    } else {
        Err(Route::Home)
    }
}

/// Result of resolving a path against the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

impl Navigation {
    /// The route that ends up displayed.
    pub fn route(&self) -> Route {
        match self {
            Navigation::Render(route) | Navigation::Redirect(route) => *route,
        }
    }
}

/// Resolve a path. Unknown paths redirect home.
pub fn navigate(path: &str, session: &Session) -> Navigation {
    let Some(route) = Route::parse(path) else {
        return Navigation::Redirect(Route::Home);
    };

    let guard = match route.access() {
        Access::Public => Ok(()),
        Access::Authenticated => require_authenticated(session),
        Access::Admin => require_admin(session),
    };
    match guard {
        Ok(()) => Navigation::Render(route),
        Err(target) => Navigation::Redirect(target),
    }
}

/// Where the shell should go after a session event, if anywhere.
pub fn redirect_for(event: &SessionEvent) -> Option<Route> {
    match event {
        SessionEvent::Invalidated => Some(Route::Login),
        _ => None,
    }
}
