//! Full lifecycle test against the live server.
//!
//! # Design
//! Starts the server with an in-memory store on a random port, then drives
//! every client operation over real HTTP using ureq, feeding results through
//! a `TodoBoard` the way a UI would.

use todo_core::{
    ApiError, CreateTodo, HttpMethod, HttpRequest, HttpResponse, PatchTodo, Priority, StatusFilter,
    TodoBoard, TodoClient,
};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Status codes are not treated as transport errors, so 4xx responses come
/// back as data and the core client interprets them.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.path).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.path).call(),
        (HttpMethod::Post, Some(body)) => {
            agent.post(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
        (HttpMethod::Put, Some(body)) => {
            agent.put(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Put, None) => agent.put(&req.path).send_empty(),
        (HttpMethod::Patch, Some(body)) => {
            agent.patch(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Patch, None) => agent.patch(&req.path).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();
    HttpResponse::new(status, body)
}

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let store = todo_server::TodoStore::in_memory().await.unwrap();
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            todo_server::run(listener, store).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[test]
fn crud_lifecycle() {
    let client = TodoClient::new(&start_server());
    let mut board = TodoBoard::new();

    // Empty list on a fresh database.
    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert!(todos.is_empty(), "expected empty list");
    board.load(todos);

    // Blank text is rejected with the server's message.
    let req = client.build_create_todo(&CreateTodo::new("   ")).unwrap();
    let err = client.parse_create_todo(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::Validation(ref msg) if msg == "text is required"));

    // Create three todos.
    let mut ids = Vec::new();
    for (text, priority) in [
        ("Buy milk", None),
        ("Walk dog", Some(Priority::High)),
        ("Read book", Some(Priority::Low)),
    ] {
        let input = CreateTodo {
            priority,
            ..CreateTodo::new(text)
        };
        let req = client.build_create_todo(&input).unwrap();
        let created = client.parse_create_todo(execute(req)).unwrap();
        assert_eq!(created.text, text);
        assert_eq!(created.priority, priority.unwrap_or_default());
        assert!(board.todos().iter().all(|t| t.sort_order < created.sort_order));
        ids.push(created.id);
        board.insert(created);
    }

    // Get one back.
    let fetched = client.parse_get_todo(execute(client.build_get_todo(ids[1]))).unwrap();
    assert_eq!(Some(&fetched), board.get(ids[1]));

    // Toggle twice.
    let toggled = client.parse_toggle_todo(execute(client.build_toggle_todo(ids[0]))).unwrap();
    assert!(toggled.completed);
    board.apply(toggled);
    board.filter.status = StatusFilter::Active;
    let visible: Vec<i64> = board.visible().iter().map(|t| t.id).collect();
    assert_eq!(visible, vec![ids[1], ids[2]]);
    board.filter.status = StatusFilter::All;

    let toggled = client.parse_toggle_todo(execute(client.build_toggle_todo(ids[0]))).unwrap();
    assert!(!toggled.completed);
    board.apply(toggled);

    // Inline edit through the board, persisted with PATCH.
    board.start_edit(ids[2]);
    board.edit_draft("Read two books");
    let (id, patch) = board.commit_edit().unwrap();
    let req = client.build_patch_todo(id, &patch).unwrap();
    let patched = client.parse_patch_todo(execute(req)).unwrap();
    assert_eq!(patched.text, "Read two books");
    assert_eq!(patched.priority, Priority::Low);
    board.apply(patched);

    // Clearing a field with an explicit null.
    let patch = PatchTodo {
        category: Some(None),
        priority: Some(Priority::Medium),
        ..PatchTodo::default()
    };
    let req = client.build_patch_todo(ids[2], &patch).unwrap();
    let patched = client.parse_patch_todo(execute(req)).unwrap();
    assert_eq!(patched.text, "Read two books");
    assert_eq!(patched.priority, Priority::Medium);
    assert!(patched.category.is_none());

    // Drag the last todo to the top and persist the new order.
    let order = board.move_todo(ids[2], ids[0]).unwrap();
    assert_eq!(order, vec![ids[2], ids[0], ids[1]]);
    let req = client.build_reorder_todos(&order).unwrap();
    let reordered = client.parse_reorder_todos(execute(req)).unwrap();
    let server_order: Vec<i64> = reordered.iter().map(|t| t.id).collect();
    assert_eq!(server_order, order);

    let listed = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    let listed_ids: Vec<i64> = listed.iter().map(|t| t.id).collect();
    assert_eq!(listed_ids, order);

    // Reorder with an unknown id is refused.
    let req = client.build_reorder_todos(&[ids[0], 9_999]).unwrap();
    let err = client.parse_reorder_todos(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // Delete, then delete again.
    client.parse_delete_todo(execute(client.build_delete_todo(ids[1]))).unwrap();
    board.remove(ids[1]);
    let err = client.parse_delete_todo(execute(client.build_delete_todo(ids[1]))).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // Server and board agree at the end.
    let listed = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    let listed_ids: Vec<i64> = listed.iter().map(|t| t.id).collect();
    let board_ids: Vec<i64> = board.todos().iter().map(|t| t.id).collect();
    assert_eq!(listed_ids, board_ids);
    assert_eq!(board.counts().active, 2);
}
