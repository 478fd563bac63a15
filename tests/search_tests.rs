//! End-to-end tests for the move searcher and the game loop.

use sphergo::board::{Board, Color};
use sphergo::game::{Game, PlayerKind};
use sphergo::search::Searcher;
use sphergo::topology::topology;

fn decode(ids: &[u16]) -> usize {
    topology().decode(ids).expect("known label")
}

#[test]
fn seeded_searchers_replay_identically() {
    let run = |seed: u64| -> Vec<usize> {
        let mut board = Board::new();
        let mut searcher = Searcher::with_seed(seed);
        let mut moves = Vec::new();
        for _ in 0..6 {
            let point = searcher.select_move(&board).expect("board far from full");
            board.play(point, board.current_player()).unwrap();
            board.switch_player();
            moves.push(point);
        }
        moves
    };
    assert_eq!(run(17), run(17));
}

#[test]
fn select_move_leaves_the_board_untouched() {
    let mut board = Board::new();
    board.play(decode(&[12]), Color::Black).unwrap();
    board.switch_player();
    let stones: Vec<Option<Color>> = (0..302).map(|p| board.stone(p)).collect();

    let mut searcher = Searcher::with_seed(4);
    searcher.select_move(&board).unwrap();

    assert_eq!(board.counter(), 1);
    assert_eq!(board.current_player(), Color::White);
    for p in 0..302 {
        assert_eq!(board.stone(p), stones[p]);
    }
}

#[test]
fn searcher_takes_a_ten_stone_ring() {
    let mut board = Board::new();
    // White owns the full ring of pentagon 0; black owns every outside
    // neighbor. The face center captures ten stones at once and no area
    // move comes close.
    let ring = [
        decode(&[0]),
        decode(&[0, 1]),
        decode(&[1]),
        decode(&[1, 2]),
        decode(&[2]),
        decode(&[2, 3]),
        decode(&[3]),
        decode(&[3, 4]),
        decode(&[4]),
        decode(&[4, 0]),
    ];
    let face = decode(&[0, 1, 2, 3, 4]);
    for &pos in &ring {
        board.place_stone(pos, Color::White);
    }
    for &pos in &ring {
        for &n in topology().neighbors(pos) {
            if !ring.contains(&n) && n != face {
                board.place_stone(n, Color::Black);
            }
        }
    }

    let mut searcher = Searcher::with_seed(2);
    assert_eq!(searcher.select_move(&board), Some(face));
}

#[test]
fn ai_seat_answers_every_human_move() {
    let mut game = Game::with_seed(PlayerKind::Human, PlayerKind::Ai, 23);
    game.start();
    for _ in 0..3 {
        // Lowest free cell; the machine may sit anywhere, so the human
        // picks relative to the current position.
        let point = game.board().get_empties(Color::Black)[0];
        game.play(point).unwrap();
        assert_eq!(game.board().current_player(), Color::Black);
    }
    assert_eq!(game.board().counter(), 6);
}

#[test]
fn ai_opening_is_reproducible() {
    let open = |seed: u64| {
        let mut game = Game::with_seed(PlayerKind::Ai, PlayerKind::Human, seed);
        game.start();
        game.board().move_log().first().cloned()
    };
    assert_eq!(open(31), open(31));
    assert!(open(31).is_some());
}
