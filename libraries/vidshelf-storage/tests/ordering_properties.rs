//! Property-based tests for the ordering engine against a real database
//!
//! Random operation sequences run both through the SQL engine and through a
//! plain `Vec` model with a cursor; after every step the stored order and
//! cursor must equal the model and positions must be exactly `0..n`.


use proptest::prelude::*;
use test_helpers::*;
use vidshelf_core::{ordering::dedup_first, VideoId};
use vidshelf_storage::playlists::{self, cursor, ordering, positions};

const POOL: &[&str] = &["v0", "v1", "v2", "v3", "v4", "v5", "v6", "v7"];

#[derive(Debug, Clone)]
enum Op {
    Add(usize, Option<u32>),
    Remove(usize),
    Move(usize, u32),
    BulkAdd(Vec<usize>, Option<u32>),
    Set(Vec<usize>),
    Clear,
    SetPosition(Option<u32>),
}

fn arbitrary_position() -> impl Strategy<Value = Option<u32>> {
    proptest::option::of(0u32..10)
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    let video = 0..POOL.len();
    prop_oneof![
        4 => (video.clone(), arbitrary_position()).prop_map(|(v, p)| Op::Add(v, p)),
        2 => video.clone().prop_map(Op::Remove),
        3 => (video.clone(), 0u32..10).prop_map(|(v, p)| Op::Move(v, p)),
        2 => (prop::collection::vec(video.clone(), 0..6), arbitrary_position())
            .prop_map(|(vs, p)| Op::BulkAdd(vs, p)),
        1 => prop::collection::vec(video, 0..8).prop_map(Op::Set),
        1 => Just(Op::Clear),
        3 => proptest::option::of(0u32..10).prop_map(Op::SetPosition),
    ]
}

fn id(index: usize) -> VideoId {
    VideoId::new(POOL[index])
}

/// Reference playlist: order plus playback cursor
#[derive(Debug, Default)]
struct Model {
    order: Vec<VideoId>,
    cursor: Option<u32>,
}

impl Model {
    /// Reference semantics of every operation on an in-memory list
    fn apply(&mut self, op: &Op) {
        let order = &mut self.order;
        match op {
            Op::Add(v, position) => {
                let video = id(*v);
                if let Some(from) = order.iter().position(|m| *m == video) {
                    let to = (position.unwrap_or(u32::MAX) as usize).min(order.len() - 1);
                    let moved = order.remove(from);
                    order.insert(to, moved);
                } else {
                    let to = position.map_or(order.len(), |p| (p as usize).min(order.len()));
                    order.insert(to, video);
                }
            }
            Op::Remove(v) => {
                let video = id(*v);
                if let Some(removed) = order.iter().position(|m| *m == video) {
                    order.remove(removed);
                    let removed = removed as u32;
                    let len = order.len() as u32;
                    self.cursor = match self.cursor {
                        _ if len == 0 => None,
                        Some(c) if removed < c => Some(c - 1),
                        Some(c) if removed == c && c >= len => Some(len - 1),
                        other => other,
                    };
                }
            }
            Op::Move(v, position) => {
                let video = id(*v);
                if let Some(from) = order.iter().position(|m| *m == video) {
                    let to = (*position as usize).min(order.len() - 1);
                    let moved = order.remove(from);
                    order.insert(to, moved);
                }
            }
            Op::BulkAdd(vs, start) => {
                let unique = dedup_first(&vs.iter().map(|v| id(*v)).collect::<Vec<_>>());
                order.retain(|m| !unique.contains(m));
                let at = start.map_or(order.len(), |p| (p as usize).min(order.len()));
                order.splice(at..at, unique);
            }
            Op::Set(vs) => {
                *order = dedup_first(&vs.iter().map(|v| id(*v)).collect::<Vec<_>>());
                if self.cursor.is_some_and(|c| c as usize >= order.len()) {
                    self.cursor = None;
                }
            }
            Op::Clear => {
                order.clear();
                self.cursor = None;
            }
            Op::SetPosition(position) => {
                if self.accepts_position(*position) {
                    self.cursor = *position;
                }
            }
        }
    }

    fn accepts_position(&self, position: Option<u32>) -> bool {
        position.map_or(true, |p| (p as usize) < self.order.len())
    }
}

/// Run `op` the way the service does, cursor rules included.
/// `position_ok` is the model's verdict for `SetPosition`.
async fn apply_to_db(
    test_db: &TestDb,
    playlist_id: &vidshelf_core::PlaylistId,
    op: &Op,
    position_ok: bool,
) {
    let mut tx = vidshelf_storage::begin_write(test_db.pool()).await.unwrap();
    match op {
        Op::Add(v, position) => {
            ordering::add(&mut tx, playlist_id, &id(*v), *position).await.unwrap();
        }
        Op::Remove(v) => {
            if let Some(removed) = ordering::remove(&mut tx, playlist_id, &id(*v)).await.unwrap() {
                let remaining = positions::count(&mut tx, playlist_id).await.unwrap();
                let mut current = cursor::load(&mut tx, playlist_id).await.unwrap();
                current.on_remove(removed, remaining);
                cursor::store(&mut tx, playlist_id, current).await.unwrap();
            }
        }
        Op::Move(v, position) => {
            if positions::position_of(&mut tx, playlist_id, &id(*v)).await.unwrap().is_some() {
                let max = positions::max_position(&mut tx, playlist_id).await.unwrap();
                let to = i64::from(*position).min(max) as u32;
                ordering::move_to(&mut tx, playlist_id, &id(*v), to).await.unwrap();
            }
        }
        Op::BulkAdd(vs, start) => {
            let ids: Vec<_> = vs.iter().map(|v| id(*v)).collect();
            ordering::bulk_add(&mut tx, playlist_id, &ids, *start).await.unwrap();
        }
        Op::Set(vs) => {
            let ids = dedup_first(&vs.iter().map(|v| id(*v)).collect::<Vec<_>>());
            ordering::set(&mut tx, playlist_id, &ids).await.unwrap();
            let mut current = cursor::load(&mut tx, playlist_id).await.unwrap();
            current.on_set(ids.len());
            cursor::store(&mut tx, playlist_id, current).await.unwrap();
        }
        Op::Clear => {
            ordering::clear(&mut tx, playlist_id).await.unwrap();
            let mut current = cursor::load(&mut tx, playlist_id).await.unwrap();
            current.on_clear();
            cursor::store(&mut tx, playlist_id, current).await.unwrap();
        }
        Op::SetPosition(position) => {
            let len = positions::count(&mut tx, playlist_id).await.unwrap();
            let mut current = cursor::load(&mut tx, playlist_id).await.unwrap();
            let result = current.set(*position, len);
            assert_eq!(result.is_ok(), position_ok, "set position {:?} on {} videos", position, len);
            if result.is_ok() {
                cursor::store(&mut tx, playlist_id, current).await.unwrap();
            }
        }
    }
    tx.commit().await.unwrap();
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Property: stored order and cursor follow the model and stay valid
    #[test]
    fn random_operations_match_model(ops in prop::collection::vec(arbitrary_op(), 1..25)) {
        runtime().block_on(async {
            let test_db = TestDb::new().await;
            create_test_videos(test_db.pool(), "ch", POOL).await;
            let playlist_id = create_test_playlist(test_db.pool(), "Model").await;
            let mut model = Model::default();

            for op in &ops {
                let position_ok = match op {
                    Op::SetPosition(position) => model.accepts_position(*position),
                    _ => true,
                };
                model.apply(op);
                apply_to_db(&test_db, &playlist_id, op, position_ok).await;

                let mut conn = test_db.conn().await;
                let stored = positions::ordered_video_ids(&mut conn, &playlist_id).await.unwrap();
                assert_eq!(stored, model.order, "after {:?}", op);
                let stored_cursor = cursor::load(&mut conn, &playlist_id).await.unwrap().get();
                assert_eq!(stored_cursor, model.cursor, "cursor after {:?}", op);
                playlists::check_invariants(&mut conn, &playlist_id)
                    .await
                    .unwrap_or_else(|e| panic!("after {:?}: {}", op, e));
            }
        });
    }

    /// Property: set then read returns exactly the input
    #[test]
    fn set_round_trips(picks in prop::sample::subsequence((0..POOL.len()).collect::<Vec<_>>(), 0..=POOL.len()), seed in any::<u64>()) {
        use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

        let mut ids: Vec<VideoId> = picks.into_iter().map(id).collect();
        ids.shuffle(&mut StdRng::seed_from_u64(seed));

        runtime().block_on(async {
            let test_db = TestDb::new().await;
            create_test_videos(test_db.pool(), "ch", POOL).await;
            let playlist_id = create_test_playlist(test_db.pool(), "Round trip").await;

            let mut conn = test_db.conn().await;
            ordering::set(&mut conn, &playlist_id, &ids).await.unwrap();
            let stored = positions::ordered_video_ids(&mut conn, &playlist_id).await.unwrap();
            assert_eq!(stored, ids);
        });
    }
}
