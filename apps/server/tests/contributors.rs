//! Organization and person endpoints with their role links

#[allow(unused)]
mod support;

use axum::http::StatusCode;
use serde_json::json;
use support::{
    assert_error_kind, assert_field_error, assert_status, id_of, ids, integer_element, items,
    ContributorBuilder, TestApp,
};

#[tokio::test]
async fn organization_round_trip() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let body = ContributorBuilder::new("American College of Radiology")
        .field("abbreviation", "ACR")
        .field("url", "https://www.acr.org")
        .field("email", "info@acr.org")
        .build();
    let (status, created) = app.post("/organizations", &body).await?;
    assert_status(status, StatusCode::CREATED, "create organization");
    let id = id_of(&created)?;

    let (_, fetched) = app.get(&format!("/organizations/{id}")).await?;
    assert_eq!(fetched["name"], "American College of Radiology");
    assert_eq!(fetched["abbreviation"], "ACR");
    assert_eq!(fetched["email"], "info@acr.org");
    assert!(fetched.get("roles").is_none(), "roles only appear on lookups");

    let update = ContributorBuilder::new("ACR")
        .field("comment", "renamed")
        .build();
    let (status, updated) = app.put(&format!("/organizations/{id}"), &update).await?;
    assert_status(status, StatusCode::OK, "update organization");
    assert_eq!(updated["name"], "ACR");
    assert_eq!(updated["abbreviation"], json!(null));

    let (status, _) = app.delete(&format!("/organizations/{id}")).await?;
    assert_status(status, StatusCode::OK, "delete organization");
    let (status, _) = app.get(&format!("/organizations/{id}")).await?;
    assert_status(status, StatusCode::NOT_FOUND, "deleted organization");
    Ok(())
}

#[tokio::test]
async fn organization_input_is_validated() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let body = ContributorBuilder::new("")
        .field("email", "not-an-email")
        .roles(&["sponsor"])
        .build();
    let (status, error) = app.post("/organizations", &body).await?;
    assert_status(status, StatusCode::BAD_REQUEST, "invalid organization");
    assert_field_error(&error, "name");
    assert_field_error(&error, "email");
    assert_field_error(&error, "roles");
    Ok(())
}

#[tokio::test]
async fn blank_email_and_url_clear_the_fields() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let body = ContributorBuilder::new("ACR")
        .field("url", "https://www.acr.org")
        .field("email", "info@acr.org")
        .build();
    let (_, created) = app.post("/organizations", &body).await?;
    let id = id_of(&created)?;

    let cleared = ContributorBuilder::new("ACR")
        .field("url", "")
        .field("email", "  ")
        .build();
    let (status, updated) = app.put(&format!("/organizations/{id}"), &cleared).await?;
    assert_status(status, StatusCode::OK, "clear email and url");
    assert_eq!(updated["url"], json!(null));
    assert_eq!(updated["email"], json!(null));
    Ok(())
}

#[tokio::test]
async fn roles_are_reported_per_target() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let set_id = app.create_set("Prostate").await?;
    let element = app
        .create_element(set_id, &integer_element("PI-RADS", 1, 5))
        .await?;
    let element_id = id_of(&element)?;

    let author = ContributorBuilder::new("Jane Roe")
        .field("orcid", "0000-0002-1825-0097")
        .set(set_id)
        .elements(&[element_id])
        .roles(&["Author", "editor"])
        .build();
    let (status, person) = app.post("/persons", &author).await?;
    assert_status(status, StatusCode::CREATED, "create person");
    let person_id = id_of(&person)?;

    let (_, on_set) = app.get(&format!("/sets/{set_id}/persons")).await?;
    assert_eq!(ids(&on_set)?, vec![person_id]);
    assert_eq!(on_set[0]["roles"], json!(["author", "editor"]));

    let (_, on_element) = app.get(&format!("/elements/{element_id}/persons")).await?;
    assert_eq!(on_element[0]["roles"], json!(["author", "editor"]));

    let sponsor = ContributorBuilder::new("RSNA")
        .set(set_id)
        .roles(&["sponsor"])
        .build();
    let (status, org) = app.post("/organizations", &sponsor).await?;
    assert_status(status, StatusCode::CREATED, "create organization");
    let (_, orgs) = app.get(&format!("/sets/{set_id}/organizations")).await?;
    assert_eq!(ids(&orgs)?, vec![id_of(&org)?]);
    assert_eq!(orgs[0]["roles"], json!(["sponsor"]));

    let (_, element_orgs) = app
        .get(&format!("/elements/{element_id}/organizations"))
        .await?;
    assert!(items(&element_orgs)?.is_empty());
    Ok(())
}

#[tokio::test]
async fn updating_links_replaces_roles_on_named_targets() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let set_id = app.create_set("Thyroid").await?;

    let body = ContributorBuilder::new("Jane Roe")
        .set(set_id)
        .roles(&["author"])
        .build();
    let (_, person) = app.post("/persons", &body).await?;
    let person_id = id_of(&person)?;

    let body = ContributorBuilder::new("Jane Roe")
        .set(set_id)
        .roles(&["reviewer"])
        .build();
    let (status, _) = app.put(&format!("/persons/{person_id}"), &body).await?;
    assert_status(status, StatusCode::OK, "update person");

    let (_, on_set) = app.get(&format!("/sets/{set_id}/persons")).await?;
    assert_eq!(on_set[0]["roles"], json!(["reviewer"]));
    Ok(())
}

#[tokio::test]
async fn links_to_missing_targets_are_not_found() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let body = ContributorBuilder::new("Jane Roe")
        .elements(&[31337])
        .roles(&["author"])
        .build();
    let (status, error) = app.post("/persons", &body).await?;
    assert_status(status, StatusCode::NOT_FOUND, "missing element");
    assert_error_kind(&error, "not_found");

    let (_, all) = app.get("/persons").await?;
    assert!(items(&all)?.is_empty(), "nothing may be written");
    Ok(())
}

#[tokio::test]
async fn deleting_a_linked_contributor_removes_its_links() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let set_id = app.create_set("Ovary").await?;

    let body = ContributorBuilder::new("Jane Roe")
        .set(set_id)
        .roles(&["author"])
        .build();
    let (_, person) = app.post("/persons", &body).await?;
    let (status, _) = app.delete(&format!("/persons/{}", id_of(&person)?)).await?;
    assert_status(status, StatusCode::OK, "delete linked person");

    let (_, on_set) = app.get(&format!("/sets/{set_id}/persons")).await?;
    assert!(items(&on_set)?.is_empty());

    let (status, _) = app.delete(&format!("/sets/{set_id}")).await?;
    assert_status(status, StatusCode::OK, "set delete after unlink");
    Ok(())
}

#[tokio::test]
async fn set_delete_clears_contributor_links() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let set_id = app.create_set("Adrenal").await?;
    let element = app
        .create_element(set_id, &integer_element("Washout", 0, 100))
        .await?;

    let body = ContributorBuilder::new("ESUR")
        .set(set_id)
        .elements(&[id_of(&element)?])
        .roles(&["contributor"])
        .build();
    let (_, org) = app.post("/organizations", &body).await?;

    let (status, _) = app.delete(&format!("/sets/{set_id}")).await?;
    assert_status(status, StatusCode::OK, "delete set with contributors");

    let (status, org) = app.get(&format!("/organizations/{}", id_of(&org)?)).await?;
    assert_status(status, StatusCode::OK, "organization survives");
    assert_eq!(org["name"], "ESUR");
    Ok(())
}

#[tokio::test]
async fn contributor_search_matches_any_text_column() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    app.post(
        "/persons",
        &ContributorBuilder::new("Jane Roe")
            .field("twitterHandle", "@NeuroRad")
            .build(),
    )
    .await?;
    app.post("/persons", &ContributorBuilder::new("John Doe").build())
        .await?;

    let (_, by_handle) = app.get("/persons/search?searchKeyword=neurorad").await?;
    assert_eq!(items(&by_handle)?.len(), 1);
    assert_eq!(by_handle[0]["name"], "Jane Roe");

    let (_, none) = app.get("/persons/search?searchKeyword=zzz").await?;
    assert!(items(&none)?.is_empty());
    Ok(())
}
