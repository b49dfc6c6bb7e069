//! Registry API routes
//!
//! Static segments such as `/search` and `/systems` share their position with the
//! `/:id` parameter; the router matches the static segment first.

use crate::api::handlers::{
    elements, images, index_codes, modules, organizations, persons, references, sets,
    specialties,
};
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn registry_routes() -> Router<AppState> {
    Router::new()
        .merge(set_routes())
        .merge(element_routes())
        .merge(organization_routes())
        .merge(person_routes())
        .merge(index_code_routes())
        .merge(reference_routes())
        .merge(image_routes())
        .merge(specialty_routes())
        .merge(module_routes())
}

fn set_routes() -> Router<AppState> {
    Router::new()
        .route("/sets", get(sets::list_sets).post(sets::create_set))
        .route("/sets/search", get(sets::search_sets))
        .route(
            "/sets/:set_id",
            get(sets::get_set)
                .put(sets::update_set)
                .delete(sets::delete_set),
        )
        .route(
            "/sets/:set_id/elements",
            get(elements::elements_in_set).post(elements::create_element),
        )
        .route(
            "/sets/:set_id/elements/:element_id",
            put(elements::update_element).delete(elements::delete_element),
        )
        .route("/sets/:set_id/persons", get(persons::persons_for_set))
        .route(
            "/sets/:set_id/organizations",
            get(organizations::organizations_for_set),
        )
}

fn element_routes() -> Router<AppState> {
    Router::new()
        .route("/elements", get(elements::list_elements))
        .route("/elements/search", get(elements::search_elements))
        .route("/elements/:element_id", get(elements::get_element))
        .route("/elements/:element_id/sets", get(sets::sets_for_element))
        .route(
            "/elements/:element_id/persons",
            get(persons::persons_for_element),
        )
        .route(
            "/elements/:element_id/organizations",
            get(organizations::organizations_for_element),
        )
}

fn organization_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations",
            get(organizations::list_organizations).post(organizations::create_organization),
        )
        .route(
            "/organizations/search",
            get(organizations::search_organizations),
        )
        .route(
            "/organizations/:id",
            get(organizations::get_organization)
                .put(organizations::update_organization)
                .delete(organizations::delete_organization),
        )
}

fn person_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/persons",
            get(persons::list_persons).post(persons::create_person),
        )
        .route("/persons/search", get(persons::search_persons))
        .route(
            "/persons/:id",
            get(persons::get_person)
                .put(persons::update_person)
                .delete(persons::delete_person),
        )
}

fn index_code_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/indexcodes",
            get(index_codes::list_index_codes).post(index_codes::create_index_code),
        )
        .route("/indexcodes/search", get(index_codes::search_index_codes))
        .route("/indexcodes/systems", get(index_codes::list_systems))
        .route(
            "/indexcodes/:id",
            get(index_codes::get_index_code)
                .put(index_codes::update_index_code)
                .delete(index_codes::delete_index_code),
        )
}

fn reference_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/references",
            get(references::list_references).post(references::create_reference),
        )
        .route("/references/search", get(references::search_references))
        .route(
            "/references/:id",
            get(references::get_reference)
                .put(references::update_reference)
                .delete(references::delete_reference),
        )
}

fn image_routes() -> Router<AppState> {
    Router::new()
        .route("/images", get(images::list_images).post(images::create_image))
        .route("/images/search", get(images::search_images))
        .route(
            "/images/:id",
            get(images::get_image)
                .put(images::update_image)
                .delete(images::delete_image),
        )
}

fn specialty_routes() -> Router<AppState> {
    Router::new()
        .route("/specialties", get(specialties::list_specialties))
        .route("/specialties/search", get(specialties::search_specialties))
        .route("/specialties/:id", get(specialties::get_specialty))
        .route(
            "/specialties/:id/elements",
            get(specialties::specialty_elements),
        )
}

fn module_routes() -> Router<AppState> {
    Router::new()
        .route("/module", post(modules::create_module))
        .route(
            "/module/source/:module_id",
            post(modules::import_from_source),
        )
        .route(
            "/module/:set_id",
            get(modules::export_module).put(modules::update_module),
        )
}
