//! Randomized games and timing checks for the board and session logic

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use server::session::{GameMessage, GameSession, Phase};
use shared::{encode_frame, Board, Packet, Tile, COLS, MAX_FRAME_LEN, ROWS, WIN_LENGTH};
use std::net::SocketAddr;
use std::time::Instant;

/// Straightforward run counter used as a reference for `Board::has_five`
fn longest_run(board: &Board, tile: Tile) -> usize {
    let mut best = 0;
    for row in 0..ROWS as isize {
        for col in 0..COLS as isize {
            for (dr, dc) in [(0, 1), (1, 0), (1, 1), (1, -1)] {
                let mut len = 0;
                let (mut r, mut c) = (row, col);
                while r >= 0
                    && c >= 0
                    && (r as usize) < ROWS
                    && (c as usize) < COLS
                    && board.get(r as usize, c as usize) == Some(tile)
                {
                    len += 1;
                    r += dr;
                    c += dc;
                }
                best = best.max(len);
            }
        }
    }
    best
}

fn lowest_empty_row(board: &Board, col: usize) -> Option<usize> {
    (0..ROWS).rev().find(|&row| board.get(row, col).is_none())
}

#[test]
fn stress_random_boards_match_reference() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..2_000 {
        let mut board = Board::new();
        let mut tile = Tile::X;
        let moves = rng.gen_range(0..=ROWS * COLS);

        for _ in 0..moves {
            let col = rng.gen_range(0..COLS);
            let expected = lowest_empty_row(&board, col);
            match board.drop_tile(col as i32, tile) {
                Ok(row) => assert_eq!(Some(row), expected),
                Err(_) => assert_eq!(expected, None),
            }
            assert!(board.is_settled());
            tile = if tile == Tile::X { Tile::O } else { Tile::X };
        }

        for tile in [Tile::X, Tile::O] {
            assert_eq!(board.has_five(tile), longest_run(&board, tile) >= WIN_LENGTH);
            if board.tile_count(tile) < WIN_LENGTH {
                assert!(!board.has_five(tile));
            }
        }
    }
}

fn addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

/// Plays a random game to completion and returns how it ended
fn random_game(rng: &mut StdRng) -> Packet {
    let mut session = GameSession::new();
    session.join(addr(1));
    session.join(addr(2));
    for (slot, name) in ["alice", "bob"].into_iter().enumerate() {
        session.handle_packet(
            slot,
            Packet::Hello {
                name: name.to_string(),
                replay: false,
            },
        );
    }
    session.drain();

    loop {
        let Phase::AwaitingMove(slot) = session.phase() else {
            panic!("game stalled in {:?}", session.phase());
        };
        let before = *session.board();
        let col = rng.gen_range(-1..=COLS as i32);
        session.handle_packet(slot, Packet::Move { col });
        let messages = session.drain();
        assert!(session.board().is_settled());

        let packets: Vec<Packet> = messages
            .into_iter()
            .filter_map(|m| match m {
                GameMessage::SendPacket { packet, .. } => Some(packet),
                GameMessage::Close { .. } => None,
            })
            .collect();

        match packets.as_slice() {
            [Packet::Rejected { .. }] => {
                assert_eq!(session.board(), &before);
                assert_eq!(session.phase(), Phase::AwaitingMove(slot));
            }
            [Packet::Update { tile, .. }, Packet::Update { .. }] => {
                assert!(!session.check_for_winner(*tile));
                assert_eq!(session.phase(), Phase::AwaitingMove(1 - slot));
            }
            [over @ Packet::GameOver { .. }, Packet::GameOver { .. }] => {
                assert_eq!(session.phase(), Phase::Finished);
                return over.clone();
            }
            other => panic!("unexpected messages {:?}", other),
        }
    }
}

#[test]
fn stress_random_sessions() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut wins = 0;
    let mut draws = 0;

    for _ in 0..500 {
        match random_game(&mut rng) {
            Packet::GameOver { draw: true, name, .. } => {
                assert!(name.is_empty());
                draws += 1;
            }
            Packet::GameOver { name, placement, .. } => {
                assert!(name == "alice" || name == "bob");
                assert!(placement.is_some());
                wins += 1;
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    println!("Random sessions: {} wins, {} draws", wins, draws);
    assert_eq!(wins + draws, 500);
}

/// Benchmarks win detection on a crowded board without a winner
#[test]
fn benchmark_win_detection() {
    let mut board = Board::new();
    // Columns alternate in pairs so no line reaches five.
    for col in 0..COLS {
        for row in 0..ROWS {
            let tile = if (row + col / 2) % 2 == 0 { Tile::X } else { Tile::O };
            board.place(row, col, tile).unwrap();
        }
    }

    let iterations = 100_000;
    let start = Instant::now();
    let mut found = 0;

    for _ in 0..iterations {
        if board.has_five(Tile::X) {
            found += 1;
        }
    }

    let duration = start.elapsed();
    println!(
        "Win detection: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert_eq!(found, 0);
    // Should complete in under 10 seconds even unoptimized
    assert!(duration.as_secs() < 10);
}

/// Benchmarks framing of the largest message the server ever sends
#[test]
fn benchmark_frame_encoding() {
    let packet = Packet::GameOver {
        name: "x".repeat(256),
        quit: false,
        is_final: false,
        draw: false,
        placement: None,
    };

    let iterations = 100_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let frame = encode_frame(&packet).unwrap();
        assert!(frame.len() < MAX_FRAME_LEN);
    }

    let duration = start.elapsed();
    println!(
        "Frame encoding: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert!(duration.as_secs() < 10);
}
