// HTTP handler bindings for Battlesnake API endpoints
//
// Thin wrappers that bind Rocket routes to the Bot's methods. Rocket
// deserializes the JSON body; malformed JSON never reaches the Bot.

use log::warn;
use rocket::http::Status;
use rocket::serde::json::Json;
use serde_json::Value;

use voronoi_snake::bot::Bot;
use voronoi_snake::types::GameState;

/// GET / endpoint
/// Returns bot metadata and appearance configuration
#[get("/")]
pub fn index(bot: &rocket::State<Bot>) -> Json<Value> {
    Json(bot.info())
}

/// POST /start endpoint
#[post("/start", format = "json", data = "<start_req>")]
pub fn start(bot: &rocket::State<Bot>, start_req: Json<GameState>) -> Json<Value> {
    Json(bot.start(
        &start_req.game,
        &start_req.turn,
        &start_req.board,
        &start_req.you,
    ))
}

/// POST /move endpoint
/// Called each turn to compute and return the next move.
/// Boards that fail validation are answered with 400.
#[post("/move", format = "json", data = "<move_req>")]
pub async fn get_move(
    bot: &rocket::State<Bot>,
    move_req: Json<GameState>,
) -> Result<Json<Value>, Status> {
    bot.get_move(
        &move_req.game,
        &move_req.turn,
        &move_req.board,
        &move_req.you,
    )
    .await
    .map(Json)
    .map_err(|e| {
        warn!("Rejecting move request for game {}: {}", move_req.game.id, e);
        Status::BadRequest
    })
}

/// POST /end endpoint
#[post("/end", format = "json", data = "<end_req>")]
pub fn end(bot: &rocket::State<Bot>, end_req: Json<GameState>) -> Json<Value> {
    Json(bot.end(&end_req.game, &end_req.turn, &end_req.board, &end_req.you))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::http::ContentType;
    use rocket::local::blocking::Client;
    use serde_json::json;
    use voronoi_snake::config::Config;

    fn client() -> Client {
        let rocket = rocket::build()
            .manage(Bot::new(Config::default_hardcoded()))
            .mount("/", routes![index, start, get_move, end]);
        Client::tracked(rocket).expect("valid rocket instance")
    }

    fn request(width: i32, height: i32) -> String {
        let me = json!({
            "id": "me", "name": "me", "health": 90,
            "body": [{"x": 1, "y": 1}, {"x": 1, "y": 0}],
            "head": {"x": 1, "y": 1}, "length": 2, "latency": "0"
        });
        json!({
            "game": {"id": "g1", "ruleset": {"name": "standard", "version": "v1"}, "timeout": 500},
            "turn": 0,
            "board": {"height": height, "width": width, "food": [], "hazards": [], "snakes": [me.clone()]},
            "you": me
        })
        .to_string()
    }

    #[test]
    fn test_start_and_end_answer_with_message() {
        let client = client();
        for path in ["/start", "/end"] {
            let response = client
                .post(path)
                .header(ContentType::JSON)
                .body(request(11, 11))
                .dispatch();
            assert_eq!(response.status(), Status::Ok);
            let body: Value = response.into_json().expect("json body");
            assert!(body["message"].is_string(), "{} answered {}", path, body);
        }
    }

    #[test]
    fn test_index_reports_api_version() {
        let client = client();
        let response = client.get("/").dispatch();
        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().expect("json body");
        assert_eq!(body["apiversion"], "1");
    }

    #[test]
    fn test_oversized_board_is_bad_request() {
        let client = client();
        let response = client
            .post("/move")
            .header(ContentType::JSON)
            .body(request(i32::MAX, 11))
            .dispatch();
        assert_eq!(response.status(), Status::BadRequest);
    }
}
