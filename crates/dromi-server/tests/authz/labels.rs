// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::support::{json_body, run_authz_cases, AuthzCase, TestApp};

#[tokio::test]
async fn test_label_authorization() {
	let app = TestApp::new().await;
	let labels_a = format!("{}/labels", app.list_path(&app.fixtures.list_a));
	let labels_b = format!("{}/labels", app.list_path(&app.fixtures.list_b));
	let label_a = format!("{labels_a}/{}", app.fixtures.label_a.label.id);
	let item_labels_a = format!(
		"{}/items/{}/labels",
		app.list_path(&app.fixtures.list_a),
		app.fixtures.item_a.id
	);
	let high = app.fixtures.label_a.values[0].id.to_string();

	let cases = vec![
		AuthzCase {
			name: "anonymous_cannot_list_labels",
			method: Method::GET,
			path: labels_a.clone(),
			user: None,
			body: None,
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "viewer_can_list_labels",
			method: Method::GET,
			path: labels_a.clone(),
			user: Some(app.fixtures.viewer.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "outsider_cannot_list_labels",
			method: Method::GET,
			path: labels_a.clone(),
			user: Some(app.fixtures.outsider.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "viewer_cannot_create_label",
			method: Method::POST,
			path: labels_a.clone(),
			user: Some(app.fixtures.viewer.clone()),
			body: Some(json!({"name": "Notes", "type": "TEXT"})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "list_editor_can_create_label",
			method: Method::POST,
			path: labels_a.clone(),
			user: Some(app.fixtures.list_editor.clone()),
			body: Some(json!({"name": "Notes", "type": "TEXT"})),
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "list_editor_cannot_create_label_on_other_list",
			method: Method::POST,
			path: labels_b.clone(),
			user: Some(app.fixtures.list_editor.clone()),
			body: Some(json!({"name": "Notes", "type": "TEXT"})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "viewer_cannot_edit_label",
			method: Method::PUT,
			path: label_a.clone(),
			user: Some(app.fixtures.viewer.clone()),
			body: Some(json!({"name": "Urgency"})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "label_of_other_list_is_not_found",
			method: Method::PUT,
			path: format!("{labels_b}/{}", app.fixtures.label_a.label.id),
			user: Some(app.fixtures.owner.clone()),
			body: Some(json!({"name": "Urgency"})),
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "viewer_cannot_apply_label_value",
			method: Method::POST,
			path: item_labels_a.clone(),
			user: Some(app.fixtures.viewer.clone()),
			body: Some(json!({"labelValueId": high})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "list_editor_can_apply_label_value",
			method: Method::POST,
			path: item_labels_a.clone(),
			user: Some(app.fixtures.list_editor.clone()),
			body: Some(json!({"labelValueId": high})),
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "viewer_cannot_remove_label_value",
			method: Method::DELETE,
			path: format!("{item_labels_a}/{high}"),
			user: Some(app.fixtures.viewer.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "list_editor_can_remove_label_value",
			method: Method::DELETE,
			path: format!("{item_labels_a}/{high}"),
			user: Some(app.fixtures.list_editor.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "list_editor_can_delete_label",
			method: Method::DELETE,
			path: label_a.clone(),
			user: Some(app.fixtures.list_editor.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "deleted_label_is_not_found",
			method: Method::DELETE,
			path: label_a.clone(),
			user: Some(app.fixtures.owner.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn select_labels_need_values() {
	let app = TestApp::new().await;
	let path = format!("{}/labels", app.list_path(&app.fixtures.list_a));
	let owner = Some(&app.fixtures.owner);

	let response = app.post(&path, owner, json!({"name": "Status"})).await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(
		json_body(response).await["message"],
		"SELECT type labels must have at least one value"
	);

	let response = app
		.post(&path, owner, json!({"name": "Tags", "type": "MULTI_SELECT", "values": []}))
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let response = app
		.post(
			&path,
			owner,
			json!({"name": "Estimate", "type": "NUMBER", "values": [{"name": "1", "color": "#111111"}]}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let response = app
		.post(
			&path,
			owner,
			json!({"name": "Status", "values": [{"name": "Blocked", "color": "blue"}]}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn label_values_are_positioned_in_order() {
	let app = TestApp::new().await;
	let path = format!("{}/labels", app.list_path(&app.fixtures.list_a));
	let owner = Some(&app.fixtures.owner);

	let created = json_body(
		app.post(
			&path,
			owner,
			json!({
				"name": "Stage",
				"type": "MULTI_SELECT",
				"values": [
					{"name": "Draft", "color": "#aaaaaa"},
					{"name": "Review", "color": "#bbbbbb"},
					{"name": "Final", "color": "#cccccc"},
				],
			}),
		)
		.await,
	)
	.await;
	let label = &created["label"];
	assert_eq!(label["type"], "MULTI_SELECT");
	let positions: Vec<_> = label["values"]
		.as_array()
		.unwrap()
		.iter()
		.map(|v| (v["name"].as_str().unwrap().to_string(), v["position"].as_i64().unwrap()))
		.collect();
	assert_eq!(
		positions,
		[
			("Draft".to_string(), 0),
			("Review".to_string(), 1),
			("Final".to_string(), 2)
		]
	);

	let values_path = format!("{path}/{}/values", label["id"].as_str().unwrap());
	let replaced = json_body(
		app.put(
			&values_path,
			owner,
			json!({"values": [{"name": "Done", "color": "#000000"}, {"name": "Todo", "color": "#ffffff"}]}),
		)
		.await,
	)
	.await;
	let values = replaced["label"]["values"].as_array().unwrap();
	assert_eq!(values.len(), 2);
	assert_eq!(values[0]["name"], "Done");
	assert_eq!(values[0]["position"], 0);
	assert_eq!(values[1]["name"], "Todo");
	assert_eq!(values[1]["position"], 1);

	let listed = json_body(app.get(&path, owner).await).await;
	let stage = listed["labels"]
		.as_array()
		.unwrap()
		.iter()
		.find(|l| l["name"] == "Stage")
		.unwrap()
		.clone();
	assert_eq!(stage["values"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn replacing_values_of_text_label_is_rejected() {
	let app = TestApp::new().await;
	let path = format!("{}/labels", app.list_path(&app.fixtures.list_a));
	let owner = Some(&app.fixtures.owner);

	let created = json_body(
		app.post(&path, owner, json!({"name": "Notes", "type": "TEXT"}))
			.await,
	)
	.await;
	let values_path = format!("{path}/{}/values", created["label"]["id"].as_str().unwrap());

	let response = app
		.put(
			&values_path,
			owner,
			json!({"values": [{"name": "x", "color": "#123456"}]}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(
		json_body(response).await["message"],
		"Can only add values to SELECT or MULTI_SELECT labels"
	);
}

#[tokio::test]
async fn select_label_keeps_one_value_per_item() {
	let app = TestApp::new().await;
	let fixtures = &app.fixtures;
	let owner = Some(&fixtures.owner);
	let item_labels = format!(
		"{}/items/{}/labels",
		app.list_path(&fixtures.list_a),
		fixtures.item_a.id
	);
	let high = fixtures.label_a.values[0].id.to_string();
	let low = fixtures.label_a.values[1].id.to_string();

	let applied = json_body(
		app.post(&item_labels, owner, json!({"labelValueId": high}))
			.await,
	)
	.await;
	assert_eq!(applied["labelValue"]["labelValueId"], high.as_str());
	assert_eq!(applied["labelValue"]["itemId"], fixtures.item_a.id.as_str());

	let response = app
		.post(&item_labels, owner, json!({"labelValueId": high}))
		.await;
	assert_eq!(response.status(), StatusCode::CONFLICT);
	assert_eq!(
		json_body(response).await["message"],
		"Conflict: Label value already applied"
	);

	let response = app
		.post(&item_labels, owner, json!({"labelValueId": low}))
		.await;
	assert_eq!(response.status(), StatusCode::OK);

	let attached = app
		.state
		.label_repo
		.list_item_label_values(&fixtures.item_a.id)
		.await
		.unwrap();
	assert_eq!(attached.len(), 1);
	assert_eq!(attached[0].label_value_id.as_str(), low);

	// `high` was detached when `low` replaced it.
	let response = app.delete(&format!("{item_labels}/{high}"), owner).await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
	assert_eq!(
		json_body(response).await["message"],
		"Todo label value not found"
	);
}

#[tokio::test]
async fn label_value_must_belong_to_the_list() {
	let app = TestApp::new().await;
	let fixtures = &app.fixtures;
	let owner = Some(&fixtures.owner);

	let other = json_body(
		app.post(
			&format!("{}/labels", app.list_path(&fixtures.list_b)),
			owner,
			json!({"name": "Venue", "values": [{"name": "Hall", "color": "#abcdef"}]}),
		)
		.await,
	)
	.await;
	let foreign_value = other["label"]["values"][0]["id"].as_str().unwrap().to_string();

	let response = app
		.post(
			&format!(
				"{}/items/{}/labels",
				app.list_path(&fixtures.list_a),
				fixtures.item_a.id
			),
			owner,
			json!({"labelValueId": foreign_value}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
