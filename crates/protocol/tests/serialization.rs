use serde_json::json;
use sk_protocol::*;

#[test]
fn test_pipeline_state_serializes_camel_case() {
    let mut state = PipelineState::for_requirement(Requirement::new(
        "A support desk assistant",
        "general",
        "model-x",
    ));
    state.task_id = Some(TaskId::new("t1"));
    state.is_running = true;

    let json = serde_json::to_value(&state).expect("Failed to serialize PipelineState");
    assert_eq!(json["taskId"], "t1");
    assert_eq!(json["isRunning"], true);
    assert_eq!(json["currentStepIndex"], 0);
    assert_eq!(json["requirement"]["type"], "general");
    assert_eq!(json["requirement"]["targetModel"], "model-x");
    assert_eq!(json["steps"].as_array().map(Vec::len), Some(5));
    assert_eq!(json["steps"][2]["kind"], "review");
    assert_eq!(json["steps"][2]["status"], "idle");

    let deserialized: PipelineState =
        serde_json::from_value(json).expect("Failed to deserialize PipelineState");
    assert_eq!(deserialized, state);
}

#[test]
fn test_op_enum_serialization() {
    let op = Op::StartPipeline {
        requirement: Requirement::new("desc", "general", "model-x"),
    };

    let json = serde_json::to_value(&op).expect("Failed to serialize Op");
    assert_eq!(json["type"], "startPipeline");
    assert!(json["payload"].is_object());

    let deserialized: Op = serde_json::from_value(json).expect("Failed to deserialize Op");
    match deserialized {
        Op::StartPipeline { requirement } => assert_eq!(requirement.target_model, "model-x"),
        _ => panic!("Wrong variant"),
    }

    let pause = serde_json::to_value(&Op::PausePipeline).expect("Failed to serialize Op::PausePipeline");
    assert_eq!(pause, json!({ "type": "pausePipeline" }));

    let recover: Op = serde_json::from_value(json!({
        "type": "recoverTask",
        "payload": { "task_id": "t7" }
    }))
    .expect("Failed to deserialize Op::RecoverTask");
    assert!(matches!(recover, Op::RecoverTask { task_id } if task_id.as_str() == "t7"));
}

#[test]
fn test_control_requests_use_engine_field_names() {
    let requirement = Requirement::new("desc", "general", "model-x");
    let create = serde_json::to_value(CreateTaskRequest::from(&requirement)).unwrap();
    assert_eq!(
        create,
        json!({ "description": "desc", "type": "general", "model": "model-x" })
    );

    let recover = serde_json::to_value(RecoverRequest {
        task_id: TaskId::new("t7"),
        parallel: true,
    })
    .unwrap();
    assert_eq!(recover, json!({ "taskId": "t7", "parallel": true }));

    let command = serde_json::to_value(TaskCommand {
        task_id: TaskId::new("t7"),
    })
    .unwrap();
    assert_eq!(command, json!({ "taskId": "t7" }));
}

#[test]
fn test_api_response_envelope() {
    let ok: ApiResponse<CreateTaskAck> =
        serde_json::from_value(json!({ "success": true, "data": { "taskId": "3f2a" } })).unwrap();
    assert_eq!(
        ok.into_result(),
        Ok(Some(CreateTaskAck {
            task_id: TaskId::new("3f2a")
        }))
    );

    let failed: ApiResponse<CreateTaskAck> =
        serde_json::from_value(json!({ "success": false, "error": "API key is not configured" }))
            .unwrap();
    assert_eq!(
        failed.into_result(),
        Err("API key is not configured".to_string())
    );

    let bare: ApiResponse<serde_json::Value> =
        serde_json::from_value(json!({ "success": true })).unwrap();
    assert_eq!(bare.into_result(), Ok(None));
}

#[test]
fn test_incomplete_task_snake_case() {
    let tasks: Vec<IncompleteTask> = serde_json::from_value(json!([
        {
            "task_id": "t7",
            "description": "A support desk assistant",
            "status": "paused",
            "completed_roles": 2,
            "total_roles": 5,
            "updated_at": "2025-01-01T10:00:00"
        },
        { "task_id": "t8" }
    ]))
    .expect("Failed to deserialize incomplete tasks");

    assert_eq!(tasks[0].completed_roles, 2);
    assert_eq!(tasks[0].total_roles, 5);
    assert_eq!(tasks[1].task_id, TaskId::new("t8"));
    assert_eq!(tasks[1].updated_at, None);
}

#[test]
fn test_review_result_accepts_plain_and_detailed_entries() {
    let review: ReviewResult = serde_json::from_value(json!({
        "score": 7.5,
        "strengths": ["clear role"],
        "weaknesses": [
            "too long",
            { "issue": "no output format", "severity": "high", "location": "end" }
        ],
        "suggestions": [{ "suggestion": "add examples", "priority": "medium" }]
    }))
    .expect("Failed to deserialize ReviewResult");

    assert_eq!(review.weaknesses[0], ReviewWeakness::Plain("too long".to_string()));
    assert!(matches!(
        &review.weaknesses[1],
        ReviewWeakness::Detailed { severity, .. } if severity == "high"
    ));
    assert!(matches!(
        &review.suggestions[0],
        ReviewSuggestion::Detailed { example: None, .. }
    ));
    assert_eq!(review.verdict, None);
}

#[test]
fn test_prompt_suite_defaults() {
    let suite: PromptSuite = serde_json::from_value(json!({
        "prompts": [{ "role_id": "triage", "role_name": "Triage", "prompt": "You triage." }]
    }))
    .expect("Failed to deserialize PromptSuite");

    assert_eq!(suite.total_roles, 0);
    assert_eq!(suite.prompts[0].role_type, RoleType::Core);
    assert!(suite.prompts[0].triggers.is_empty());
}
