use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;
use spy_cat_agency::api::create_router;
use spy_cat_agency::breeds::FixedBreeds;
use spy_cat_agency::db::Database;
use spy_cat_agency::models::*;
use spy_cat_agency::services::Services;
use uuid::Uuid;

fn setup() -> TestServer {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let services = Services::new(db, Arc::new(FixedBreeds::new(["Siamese", "Persian"])));
    TestServer::new(create_router(services)).expect("Failed to create test server")
}

async fn create_test_cat(server: &TestServer, name: &str) -> Cat {
    server
        .post("/api/v1/cats")
        .json(&CreateCatInput {
            name: name.to_string(),
            years_experience: 4,
            breed: "Siamese".to_string(),
            salary: 1500.0,
        })
        .await
        .json::<Cat>()
}

async fn create_test_mission(
    server: &TestServer,
    cat_id: Option<Uuid>,
    targets: &[&str],
) -> MissionWithTargets {
    server
        .post("/api/v1/missions")
        .json(&CreateMissionInput {
            cat_id,
            targets: targets
                .iter()
                .map(|name| TargetInput {
                    name: name.to_string(),
                    country: "France".to_string(),
                })
                .collect(),
        })
        .await
        .json::<MissionWithTargets>()
}

async fn get_cat(server: &TestServer, id: Uuid) -> Cat {
    server.get(&format!("/api/v1/cats/{}", id)).await.json::<Cat>()
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_ok() {
        let server = setup();

        let response = server.get("/api/v1/health").await;

        response.assert_status_ok();
        response.assert_json(&json!({ "status": "ok" }));
    }
}

mod cats {
    use super::*;

    #[tokio::test]
    async fn creates_cat() {
        let server = setup();

        let response = server
            .post("/api/v1/cats")
            .json(&json!({
                "name": "Tom",
                "years_experience": 3,
                "breed": "Persian",
                "salary": 999.5
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let cat: Cat = response.json();
        assert_eq!(cat.name, "Tom");
        assert_eq!(cat.breed, "Persian");
        assert!(cat.is_available);
    }

    #[tokio::test]
    async fn rejects_unknown_breed() {
        let server = setup();

        let response = server
            .post("/api/v1/cats")
            .json(&json!({
                "name": "Tom",
                "years_experience": 3,
                "breed": "Gryphon",
                "salary": 100.0
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("Gryphon"));
    }

    #[tokio::test]
    async fn rejects_short_name() {
        let server = setup();

        let response = server
            .post("/api/v1/cats")
            .json(&json!({
                "name": "T",
                "years_experience": 3,
                "breed": "Siamese",
                "salary": 100.0
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn experience_out_of_range_is_bad_request_on_both_ends() {
        let server = setup();

        for years in [-1, 51] {
            let response = server
                .post("/api/v1/cats")
                .json(&json!({
                    "name": "Tom",
                    "years_experience": years,
                    "breed": "Siamese",
                    "salary": 100.0
                }))
                .await;

            response.assert_status(StatusCode::BAD_REQUEST);
            assert!(response.text().contains("years_experience"));
        }
    }

    #[tokio::test]
    async fn lists_cats() {
        let server = setup();
        create_test_cat(&server, "Tom").await;
        create_test_cat(&server, "Felix").await;

        let cats: Vec<Cat> = server.get("/api/v1/cats").await.json();

        let names: Vec<_> = cats.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Tom", "Felix"]);
    }

    #[tokio::test]
    async fn updates_salary_only() {
        let server = setup();
        let cat = create_test_cat(&server, "Tom").await;

        let response = server
            .put(&format!("/api/v1/cats/{}", cat.id))
            .json(&json!({ "salary": 2000.0 }))
            .await;

        response.assert_status_ok();
        let updated: Cat = response.json();
        assert_eq!(updated.salary, 2000.0);
        assert_eq!(updated.name, "Tom");
    }

    #[tokio::test]
    async fn returns_404_for_missing_cat() {
        let server = setup();

        let response = server
            .get(&format!("/api/v1/cats/{}", Uuid::new_v4()))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn deletes_idle_cat() {
        let server = setup();
        let cat = create_test_cat(&server, "Tom").await;

        server
            .delete(&format!("/api/v1/cats/{}", cat.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .get(&format!("/api/v1/cats/{}", cat.id))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn refuses_to_delete_busy_cat() {
        let server = setup();
        let cat = create_test_cat(&server, "Tom").await;
        create_test_mission(&server, Some(cat.id), &["Jerry"]).await;

        server
            .delete(&format!("/api/v1/cats/{}", cat.id))
            .await
            .assert_status(StatusCode::CONFLICT);
    }
}

mod missions {
    use super::*;

    #[tokio::test]
    async fn creates_mission_with_targets_and_claims_cat() {
        let server = setup();
        let cat = create_test_cat(&server, "Tom").await;

        let response = server
            .post("/api/v1/missions")
            .json(&json!({
                "cat_id": cat.id,
                "targets": [
                    { "name": "Jerry", "country": "US" },
                    { "name": "Spike", "country": "UK" }
                ]
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let mission: MissionWithTargets = response.json();
        assert_eq!(mission.mission.cat_id, Some(cat.id));
        assert_eq!(mission.targets.len(), 2);
        assert!(mission.targets.iter().all(|t| t.notes.is_empty()));
        assert!(!get_cat(&server, cat.id).await.is_available);
    }

    #[tokio::test]
    async fn serializes_targets_inline_with_mission_fields() {
        let server = setup();
        let created = create_test_mission(&server, None, &["Jerry"]).await;

        let body: serde_json::Value = server
            .get(&format!("/api/v1/missions/{}", created.mission.id))
            .await
            .json();

        assert_eq!(body["id"], json!(created.mission.id));
        assert_eq!(body["cat_id"], serde_json::Value::Null);
        assert_eq!(body["cat"], serde_json::Value::Null);
        assert_eq!(body["is_completed"], json!(false));
        assert_eq!(body["targets"][0]["name"], json!("Jerry"));
    }

    #[tokio::test]
    async fn embeds_assigned_cat() {
        let server = setup();
        let cat = create_test_cat(&server, "Tom").await;
        let created = create_test_mission(&server, Some(cat.id), &["Jerry"]).await;

        let body: serde_json::Value = server
            .get(&format!("/api/v1/missions/{}", created.mission.id))
            .await
            .json();

        assert_eq!(body["cat_id"], json!(cat.id));
        assert_eq!(body["cat"]["name"], json!("Tom"));
        assert_eq!(body["cat"]["is_available"], json!(false));
    }

    #[tokio::test]
    async fn rejects_mission_without_targets() {
        let server = setup();

        let response = server
            .post("/api/v1/missions")
            .json(&json!({ "targets": [] }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_busy_cat() {
        let server = setup();
        let cat = create_test_cat(&server, "Tom").await;
        create_test_mission(&server, Some(cat.id), &["Jerry"]).await;

        let response = server
            .post("/api/v1/missions")
            .json(&json!({
                "cat_id": cat.id,
                "targets": [{ "name": "Spike", "country": "UK" }]
            }))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.text(), "cat is not available");
        let missions: Vec<MissionWithTargets> = server.get("/api/v1/missions").await.json();
        assert_eq!(missions.len(), 1);
    }

    #[tokio::test]
    async fn assigns_cat_through_dedicated_route() {
        let server = setup();
        let cat = create_test_cat(&server, "Tom").await;
        let mission = create_test_mission(&server, None, &["Jerry"]).await;

        let response = server
            .put(&format!("/api/v1/missions/{}/assign", mission.mission.id))
            .json(&AssignCatInput { cat_id: cat.id })
            .await;

        response.assert_status_ok();
        let updated: MissionWithTargets = response.json();
        assert_eq!(updated.mission.cat_id, Some(cat.id));
        assert!(!get_cat(&server, cat.id).await.is_available);
    }

    #[tokio::test]
    async fn update_reassigns_and_frees_previous_cat() {
        let server = setup();
        let tom = create_test_cat(&server, "Tom").await;
        let felix = create_test_cat(&server, "Felix").await;
        let mission = create_test_mission(&server, Some(tom.id), &["Jerry"]).await;

        let response = server
            .put(&format!("/api/v1/missions/{}", mission.mission.id))
            .json(&json!({ "cat_id": felix.id }))
            .await;

        response.assert_status_ok();
        assert!(get_cat(&server, tom.id).await.is_available);
        assert!(!get_cat(&server, felix.id).await.is_available);
    }

    #[tokio::test]
    async fn refuses_to_delete_assigned_mission() {
        let server = setup();
        let cat = create_test_cat(&server, "Tom").await;
        let mission = create_test_mission(&server, Some(cat.id), &["Jerry"]).await;

        server
            .delete(&format!("/api/v1/missions/{}", mission.mission.id))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn deletes_unassigned_mission() {
        let server = setup();
        let mission = create_test_mission(&server, None, &["Jerry"]).await;

        server
            .delete(&format!("/api/v1/missions/{}", mission.mission.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .get(&format!("/api/v1/missions/{}", mission.mission.id))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn refuses_to_complete_with_open_targets() {
        let server = setup();
        let mission = create_test_mission(&server, None, &["Jerry"]).await;

        let response = server
            .put(&format!("/api/v1/missions/{}/complete", mission.mission.id))
            .await;

        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn end_to_end() {
        let server = setup();
        let tom = create_test_cat(&server, "Tom").await;
        let mission = create_test_mission(&server, Some(tom.id), &["Jerry"]).await;
        let base = format!(
            "/api/v1/missions/{}/targets/{}",
            mission.mission.id, mission.targets[0].id
        );

        for notes in ["hides in walls", "likes cheese"] {
            server
                .put(&format!("{}/notes", base))
                .json(&UpdateNotesInput {
                    notes: notes.to_string(),
                })
                .await
                .assert_status_ok();
        }

        let target: Target = server.put(&format!("{}/complete", base)).await.json();
        assert!(target.is_completed);
        assert_eq!(target.notes, "hides in walls\nlikes cheese");

        let response = server
            .put(&format!("/api/v1/missions/{}/complete", mission.mission.id))
            .await;
        response.assert_status_ok();
        let completed: MissionWithTargets = response.json();
        assert!(completed.mission.is_completed);
        assert!(get_cat(&server, tom.id).await.is_available);

        server
            .put(&format!("{}/notes", base))
            .json(&json!({ "notes": "too late" }))
            .await
            .assert_status(StatusCode::CONFLICT);
    }
}

mod targets {
    use super::*;

    #[tokio::test]
    async fn adds_target_up_to_three() {
        let server = setup();
        let mission = create_test_mission(&server, None, &["Jerry", "Spike"]).await;
        let url = format!("/api/v1/missions/{}/targets", mission.mission.id);

        let response = server
            .post(&url)
            .json(&json!({ "name": "Tyke", "country": "US" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let target: Target = response.json();
        assert_eq!(target.mission_id, mission.mission.id);

        server
            .post(&url)
            .json(&json!({ "name": "Butch", "country": "US" }))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn updates_open_target() {
        let server = setup();
        let mission = create_test_mission(&server, None, &["Jerry"]).await;

        let response = server
            .put(&format!(
                "/api/v1/missions/{}/targets/{}",
                mission.mission.id, mission.targets[0].id
            ))
            .json(&json!({ "name": "Jerry Mouse", "country": "Canada" }))
            .await;

        response.assert_status_ok();
        let target: Target = response.json();
        assert_eq!(target.name, "Jerry Mouse");
        assert_eq!(target.country, "Canada");
    }

    #[tokio::test]
    async fn deletes_open_target() {
        let server = setup();
        let mission = create_test_mission(&server, None, &["Jerry", "Spike"]).await;

        server
            .delete(&format!(
                "/api/v1/missions/{}/targets/{}",
                mission.mission.id, mission.targets[0].id
            ))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let reloaded: MissionWithTargets = server
            .get(&format!("/api/v1/missions/{}", mission.mission.id))
            .await
            .json();
        assert_eq!(reloaded.targets.len(), 1);
    }

    #[tokio::test]
    async fn rejects_empty_notes() {
        let server = setup();
        let mission = create_test_mission(&server, None, &["Jerry"]).await;

        server
            .put(&format!(
                "/api/v1/missions/{}/targets/{}/notes",
                mission.mission.id, mission.targets[0].id
            ))
            .json(&json!({ "notes": "" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn target_of_other_mission_is_not_found() {
        let server = setup();
        let first = create_test_mission(&server, None, &["Jerry"]).await;
        let second = create_test_mission(&server, None, &["Spike"]).await;

        server
            .put(&format!(
                "/api/v1/missions/{}/targets/{}/complete",
                first.mission.id, second.targets[0].id
            ))
            .await
            .assert_status_not_found();
    }
}
