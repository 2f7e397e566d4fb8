//! End-to-end games driven through the public engine API with scripted pieces.

use blockfall::{
    Cell, Command, Controls, Direction, EngineConfig, Field, GameEvent, Phase, Piece, PieceKind,
    Sequence, Session, can_place,
};

fn session(kinds: &[PieceKind]) -> Session {
    let mut s = Session::new(
        EngineConfig::default(),
        Box::new(Sequence::new(kinds.to_vec())),
    )
    .unwrap();
    s.start();
    s.take_events();
    s
}

fn shift(s: &mut Session, dx: i32) {
    let direction = if dx < 0 { Direction::Left } else { Direction::Right };
    for _ in 0..dx.unsigned_abs() {
        assert!(s.move_piece(direction));
    }
}

fn filled_count(field: &Field) -> usize {
    field.rows().flatten().filter(|c| c.is_filled()).count()
}

#[test]
fn placement_respects_walls_floor_and_open_top() {
    let field = Field::new(10, 20);
    let i = Piece::spawn(PieceKind::I, 10);
    assert!(can_place(&i, &field));
    assert!(can_place(&i.moved(-4, 0), &field));
    assert!(!can_place(&i.moved(-5, 0), &field));
    assert!(can_place(&i.moved(2, 0), &field));
    assert!(!can_place(&i.moved(3, 0), &field));
    assert!(can_place(&i.moved(0, -2), &field));
    assert!(can_place(&i.moved(0, 19), &field));
    assert!(!can_place(&i.moved(0, 20), &field));
}

#[test]
fn rotation_cycles_back_to_spawn_shape() {
    for kind in PieceKind::ALL {
        let spawn = Piece::spawn(kind, 10);
        let mut p = spawn;
        for _ in 0..kind.rotation_count() {
            p = p.rotated();
        }
        assert_eq!(p, spawn, "{kind:?}");
    }
}

#[test]
fn one_row_clear_scores_drops_and_line() {
    let mut s = session(&[PieceKind::I, PieceKind::I, PieceKind::O]);

    shift(&mut s, -4);
    s.hard_drop();
    s.hard_drop();
    shift(&mut s, 4);
    s.hard_drop();

    let snap = s.snapshot();
    assert_eq!(snap.lines, 1);
    assert_eq!(snap.level, 1);
    // 19 + 19 + 18 cells hard dropped at 2 each, plus one line at level 1
    assert_eq!(snap.score, 38 + 38 + 36 + 100);
    assert_eq!(snap.field.height(), 20);
    // Upper half of the O remains, shifted down onto the floor
    assert_eq!(filled_count(snap.field), 2);
    assert_eq!(snap.field.get(8, 19), Some(Cell::Filled(PieceKind::O)));
    assert_eq!(snap.field.get(9, 19), Some(Cell::Filled(PieceKind::O)));

    let events = s.take_events();
    assert!(events.contains(&GameEvent::LinesCleared {
        rows: vec![19],
        cells: vec![
            [PieceKind::I; 8]
                .into_iter()
                .chain([PieceKind::O; 2])
                .map(Cell::Filled)
                .collect()
        ],
    }));
}

#[test]
fn four_rows_at_once_score_the_top_entry() {
    let mut s = session(&[PieceKind::I]);
    for column in 0..10 {
        assert!(s.rotate());
        shift(&mut s, column - 4);
        s.hard_drop();
    }
    let snap = s.snapshot();
    assert_eq!(snap.lines, 4);
    // Vertical I falls 16 rows from spawn
    assert_eq!(snap.score, 10 * 32 + 800);
    assert_eq!(filled_count(snap.field), 0);
    assert_eq!(snap.field.height(), 20);
    assert_eq!(snap.phase, Phase::Running);
}

#[test]
fn hard_dropped_i_rests_on_floor_without_clearing() {
    let mut s = session(&[PieceKind::I, PieceKind::T]);
    s.hard_drop();
    let snap = s.snapshot();
    assert_eq!(snap.lines, 0);
    assert_eq!(snap.score, 38);
    for x in 4..8 {
        assert_eq!(snap.field.get(x, 19), Some(Cell::Filled(PieceKind::I)));
    }
    assert_eq!(snap.current.map(|p| p.kind), Some(PieceKind::T));
}

#[test]
fn hold_flag_lifecycle() {
    let mut s = session(&[PieceKind::T, PieceKind::O, PieceKind::S, PieceKind::Z]);

    assert!(s.hold());
    let snap = s.snapshot();
    assert_eq!(snap.held.map(|p| p.kind), Some(PieceKind::T));
    assert_eq!(snap.current.map(|p| p.kind), Some(PieceKind::O));
    assert_eq!(snap.next.map(|p| p.kind), Some(PieceKind::S));
    assert!(!snap.can_hold);

    assert!(!s.hold());

    s.hard_drop();
    assert!(s.snapshot().can_hold);

    assert!(s.move_piece(Direction::Left));
    assert!(s.hold());
    let snap = s.snapshot();
    assert_eq!(snap.current, Some(Piece::spawn(PieceKind::T, 10)));
    assert_eq!(snap.held.map(|p| p.kind), Some(PieceKind::S));
}

#[test]
fn gravity_runs_on_elapsed_time_only_while_running() {
    let mut s = session(&[PieceKind::O]);
    s.tick(999);
    assert_eq!(s.snapshot().current.map(|p| p.y), Some(0));
    s.tick(1);
    assert_eq!(s.snapshot().current.map(|p| p.y), Some(1));

    s.pause();
    s.pause();
    s.tick(10_000);
    assert_eq!(s.snapshot().current.map(|p| p.y), Some(1));
    assert_eq!(s.take_events(), vec![GameEvent::Paused]);

    s.resume();
    s.resume();
    assert_eq!(s.take_events(), vec![GameEvent::Resumed]);
    s.tick(1000);
    assert_eq!(s.snapshot().current.map(|p| p.y), Some(2));
}

#[test]
fn stacking_to_the_top_ends_and_restart_resets() {
    let mut s = session(&[PieceKind::O]);
    for _ in 0..10 {
        assert_eq!(s.phase(), Phase::Running);
        s.apply(Command::HardDrop);
    }
    assert_eq!(s.phase(), Phase::Over);
    assert_eq!(s.snapshot().score, 2 * (18 + 16 + 14 + 12 + 10 + 8 + 6 + 4 + 2));
    assert!(s.take_events().contains(&GameEvent::GameOver));

    s.apply(Command::MoveLeft);
    s.tick(5_000);
    assert_eq!(s.phase(), Phase::Over);

    s.apply(Command::Start);
    let snap = s.snapshot();
    assert_eq!(snap.phase, Phase::Running);
    assert_eq!((snap.score, snap.lines, snap.level), (0, 0, 1));
    assert_eq!(filled_count(snap.field), 0);
}
