//! Backend endpoint registry.
//!
//! Every path exposed by the backend lives here, grouped by resource. Most routes are literal
//! strings; detail-style routes are builders that append a single identifier. Builders never
//! validate their input, so a malformed identifier yields a malformed path.

// self
use crate::_prelude::*;

/// Resource groups exposed by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EndpointGroup {
	/// Authentication and session management.
	Auth,
	/// Course catalogue.
	Cursos,
	/// Per-user shopping cart.
	Cart,
	/// Per-user wishlist.
	Wishlist,
	/// Checkout and payment history.
	Payment,
	/// Connectivity probes.
	Test,
}
impl EndpointGroup {
	/// All groups, in registry order.
	pub const ALL: [Self; 6] =
		[Self::Auth, Self::Cursos, Self::Cart, Self::Wishlist, Self::Payment, Self::Test];

	/// Returns the stable label of the group.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Auth => "AUTH",
			Self::Cursos => "CURSOS",
			Self::Cart => "CART",
			Self::Wishlist => "WISHLIST",
			Self::Payment => "PAYMENT",
			Self::Test => "TEST",
		}
	}
}
impl Display for EndpointGroup {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for EndpointGroup {
	type Err = UnknownGroup;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|group| group.as_str().eq_ignore_ascii_case(s))
			.ok_or_else(|| UnknownGroup(s.to_owned()))
	}
}

/// Error returned when a group label does not name a known group.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown endpoint group `{0}`.")]
pub struct UnknownGroup(pub String);

/// A single registry entry: either a literal path or a one-identifier path builder.
#[derive(Clone, Copy)]
pub enum Route {
	/// Literal path.
	Static(&'static str),
	/// Path built from one identifier.
	Param(fn(&str) -> String),
}
impl Route {
	/// Renders the route; the identifier is ignored by static routes and substituted
	/// verbatim by builders (an absent identifier renders as an empty segment).
	pub fn resolve(&self, id: Option<&str>) -> String {
		match self {
			Self::Static(path) => (*path).to_owned(),
			Self::Param(build) => build(id.unwrap_or_default()),
		}
	}

	/// Whether the route needs an identifier.
	pub const fn is_param(&self) -> bool {
		matches!(self, Self::Param(_))
	}
}
impl Debug for Route {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Static(path) => f.debug_tuple("Static").field(path).finish(),
			Self::Param(build) => f.debug_tuple("Param").field(&build("{id}")).finish(),
		}
	}
}
impl PartialEq for Route {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Static(a), Self::Static(b)) => a == b,
			(Self::Param(a), Self::Param(b)) => a("{id}") == b("{id}"),
			_ => false,
		}
	}
}
impl Eq for Route {}

/// Authentication routes.
#[derive(Clone, Copy, Debug)]
pub struct AuthRoutes {
	/// `POST` credentials, returns access + refresh tokens.
	pub login: &'static str,
	/// `POST` a new account.
	pub register: &'static str,
	/// `POST` to end the current session.
	pub logout: &'static str,
	/// `GET` the authenticated user.
	pub profile: &'static str,
	/// `POST` a refresh token for a new access token.
	pub refresh: &'static str,
}

/// Course catalogue routes.
#[derive(Clone, Copy, Debug)]
pub struct CursosRoutes {
	/// Course listing.
	pub list: &'static str,
	/// Single course, by identifier.
	pub detail: fn(&str) -> String,
	/// Course search.
	pub search: &'static str,
}

/// Collection routes shared by the cart and the wishlist.
#[derive(Clone, Copy, Debug)]
pub struct CollectionRoutes {
	/// Collection contents.
	pub list: &'static str,
	/// Add an item.
	pub add: &'static str,
	/// Remove an item.
	pub remove: &'static str,
	/// Remove every item.
	pub clear: &'static str,
}

/// Payment routes.
#[derive(Clone, Copy, Debug)]
pub struct PaymentRoutes {
	/// Create a checkout session.
	pub create_session: &'static str,
	/// Status of a checkout session, by session identifier.
	pub check_status: fn(&str) -> String,
	/// Payment history of the authenticated user.
	pub history: &'static str,
}

/// Connectivity probe routes.
#[derive(Clone, Copy, Debug)]
pub struct TestRoutes {
	/// Liveness probe.
	pub ping: &'static str,
	/// CORS echo probe.
	pub cors: &'static str,
}

fn curso_detail(id: &str) -> String {
	format!("/api/cursos/{id}")
}

fn payment_status(session_id: &str) -> String {
	format!("/api/payment/check-payment-status/{session_id}")
}

/// Authentication routes.
pub const AUTH: AuthRoutes = AuthRoutes {
	login: "/api/auth/login",
	register: "/api/auth/register",
	logout: "/api/auth/logout",
	profile: "/api/auth/profile",
	refresh: "/api/auth/refresh",
};
/// Course catalogue routes.
pub const CURSOS: CursosRoutes =
	CursosRoutes { list: "/api/cursos/", detail: curso_detail, search: "/api/cursos/search" };
/// Cart routes.
pub const CART: CollectionRoutes = CollectionRoutes {
	list: "/api/user/cart",
	add: "/api/user/cart/add",
	remove: "/api/user/cart/remove",
	clear: "/api/user/cart/clear",
};
/// Wishlist routes.
pub const WISHLIST: CollectionRoutes = CollectionRoutes {
	list: "/api/user/wishlist",
	add: "/api/user/wishlist/add",
	remove: "/api/user/wishlist/remove",
	clear: "/api/user/wishlist/clear",
};
/// Payment routes.
pub const PAYMENT: PaymentRoutes = PaymentRoutes {
	create_session: "/api/payment/create-checkout-session",
	check_status: payment_status,
	history: "/api/payment/history",
};
/// Connectivity probe routes.
pub const TEST: TestRoutes = TestRoutes { ping: "/api/test/ping", cors: "/api/test/cors-test" };

/// Name-based view over the registry.
#[derive(Clone, Copy, Debug, Default)]
pub struct EndpointTable;
impl EndpointTable {
	/// Looks up a route by group and action name (`LOGIN`, `DETAIL`, `CHECK_STATUS`, ...).
	/// Action names are matched case-insensitively.
	pub fn get(group: EndpointGroup, action: &str) -> Option<Route> {
		Self::entries()
			.into_iter()
			.find(|(g, name, _)| *g == group && name.eq_ignore_ascii_case(action))
			.map(|(_, _, route)| route)
	}

	/// Every `(group, action, route)` triple, in registry order.
	pub fn entries() -> Vec<(EndpointGroup, &'static str, Route)> {
		use EndpointGroup::*;
		use Route::*;

		vec![
			(Auth, "LOGIN", Static(AUTH.login)),
			(Auth, "REGISTER", Static(AUTH.register)),
			(Auth, "LOGOUT", Static(AUTH.logout)),
			(Auth, "PROFILE", Static(AUTH.profile)),
			(Auth, "REFRESH", Static(AUTH.refresh)),
			(Cursos, "LIST", Static(CURSOS.list)),
			(Cursos, "DETAIL", Param(CURSOS.detail)),
			(Cursos, "SEARCH", Static(CURSOS.search)),
			(Cart, "LIST", Static(CART.list)),
			(Cart, "ADD", Static(CART.add)),
			(Cart, "REMOVE", Static(CART.remove)),
			(Cart, "CLEAR", Static(CART.clear)),
			(Wishlist, "LIST", Static(WISHLIST.list)),
			(Wishlist, "ADD", Static(WISHLIST.add)),
			(Wishlist, "REMOVE", Static(WISHLIST.remove)),
			(Wishlist, "CLEAR", Static(WISHLIST.clear)),
			(Payment, "CREATE_SESSION", Static(PAYMENT.create_session)),
			(Payment, "CHECK_STATUS", Param(PAYMENT.check_status)),
			(Payment, "HISTORY", Static(PAYMENT.history)),
			(Test, "PING", Static(TEST.ping)),
			(Test, "CORS", Static(TEST.cors)),
		]
	}

	/// Actions registered under a group.
	pub fn actions(group: EndpointGroup) -> Vec<&'static str> {
		Self::entries().into_iter().filter(|(g, ..)| *g == group).map(|(_, a, _)| a).collect()
	}
}
