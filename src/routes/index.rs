use rocket::get;
use rocket_okapi::openapi;

pub const WELCOME_MESSAGE: &str = "Welcome to the Bookstore Inventory Management System!";

/// Welcome banner
#[openapi(tag = "Index")]
#[get("/")]
pub async fn index() -> &'static str {
    WELCOME_MESSAGE
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![index]
}
