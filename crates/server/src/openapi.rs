use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct TodoDoc { pub id: String, pub title: String, pub completed: bool }

#[derive(ToSchema)]
pub struct CreateTodoRequest { pub title: String }

#[derive(ToSchema)]
pub struct CreatedDoc { pub id: String }

#[derive(ToSchema)]
pub struct CompletedDoc { pub id: String, pub completed: bool, pub changed: bool }

#[derive(ToSchema)]
pub struct DeletedDoc { pub id: String }

#[derive(ToSchema)]
pub struct DeletedAllDoc { pub deleted: u64 }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::todos::list,
        crate::routes::todos::create,
        crate::routes::todos::complete,
        crate::routes::todos::delete_one,
        crate::routes::todos::delete_all,
    ),
    components(
        schemas(
            HealthResponse,
            TodoDoc,
            CreateTodoRequest,
            CreatedDoc,
            CompletedDoc,
            DeletedDoc,
            DeletedAllDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "todos")
    )
)]
pub struct ApiDoc;
