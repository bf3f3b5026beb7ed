//! Fake schedules with their overrides and events.

use chrono::{Duration, Utc};
use fake::Fake;
use fake::faker::lorem::en::{Sentence, Words};
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use std::time::Instant;
use uuid::Uuid;

use super::models::{EventSeed, OverrideSeed, ScheduleSeed};

const BATCH_SIZE: usize = 500;
const MANAGE: i32 = 3;

fn title_case(words: Vec<String>) -> String {
    words
        .into_iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn generate_schedules(owner_ids: &[Uuid], per_owner: usize) -> Vec<ScheduleSeed> {
    owner_ids
        .par_iter()
        .flat_map(|&owner_id| {
            (0..per_owner)
                .map(|_| ScheduleSeed {
                    name: title_case(Words(1..4).fake::<Vec<String>>()),
                    owner_id,
                    default_permission_level: (0..3).fake::<i32>(),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// The owner's MANAGE override plus `per_schedule` overrides for other users.
pub fn generate_overrides(
    schedules: &[(Uuid, Uuid)],
    user_ids: &[Uuid],
    per_schedule: usize,
) -> Vec<OverrideSeed> {
    schedules
        .par_iter()
        .flat_map(|&(schedule_id, owner_id)| {
            let mut overrides = vec![OverrideSeed {
                schedule_id,
                user_id: owner_id,
                level: MANAGE,
            }];
            let others: Vec<Uuid> = user_ids.iter().copied().filter(|id| *id != owner_id).collect();
            if !others.is_empty() {
                let offset = (0..others.len()).fake::<usize>();
                overrides.extend(
                    others
                        .iter()
                        .cycle()
                        .skip(offset)
                        .take(per_schedule.min(others.len()))
                        .map(|&user_id| OverrideSeed {
                            schedule_id,
                            user_id,
                            level: (0..=MANAGE).fake::<i32>(),
                        }),
                );
            }
            overrides
        })
        .collect()
}

/// Events spread over the weeks around today.
pub fn generate_events(schedule_ids: &[Uuid], per_schedule: usize) -> Vec<EventSeed> {
    let now = Utc::now();
    schedule_ids
        .par_iter()
        .flat_map(|&schedule_id| {
            (0..per_schedule)
                .map(|_| {
                    let start = now + Duration::hours((-24 * 14..24 * 28).fake::<i64>());
                    EventSeed {
                        schedule_id,
                        title: title_case(Words(2..5).fake::<Vec<String>>()),
                        description: Sentence(4..12).fake::<String>(),
                        start_date: start,
                        end_date: start + Duration::minutes((45..180).fake::<i64>()),
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

async fn insert_schedules(
    tx: &mut Transaction<'_, Postgres>,
    schedules: &[ScheduleSeed],
) -> anyhow::Result<Vec<(Uuid, Uuid)>> {
    let mut rows = Vec::with_capacity(schedules.len());
    for chunk in schedules.chunks(BATCH_SIZE) {
        let mut query = QueryBuilder::<Postgres>::new(
            "INSERT INTO schedules (name, owner_id, default_permission_level) ",
        );
        query.push_values(chunk, |mut row, schedule| {
            row.push_bind(&schedule.name)
                .push_bind(schedule.owner_id)
                .push_bind(schedule.default_permission_level);
        });
        query.push(" RETURNING id, owner_id");

        let chunk_rows: Vec<(Uuid, Uuid)> = query.build_query_as().fetch_all(&mut **tx).await?;
        rows.extend(chunk_rows);
    }
    Ok(rows)
}

async fn insert_overrides(
    tx: &mut Transaction<'_, Postgres>,
    overrides: &[OverrideSeed],
) -> anyhow::Result<u64> {
    let mut inserted = 0;
    for chunk in overrides.chunks(BATCH_SIZE) {
        let mut query = QueryBuilder::<Postgres>::new(
            "INSERT INTO schedule_permissions (schedule_id, user_id, level) ",
        );
        query.push_values(chunk, |mut row, o| {
            row.push_bind(o.schedule_id).push_bind(o.user_id).push_bind(o.level);
        });
        query.push(" ON CONFLICT (schedule_id, user_id) DO NOTHING");
        inserted += query.build().execute(&mut **tx).await?.rows_affected();
    }
    Ok(inserted)
}

async fn insert_events(
    tx: &mut Transaction<'_, Postgres>,
    events: &[EventSeed],
) -> anyhow::Result<u64> {
    let mut inserted = 0;
    for chunk in events.chunks(BATCH_SIZE) {
        let mut query = QueryBuilder::<Postgres>::new(
            "INSERT INTO events (schedule_id, type_id, title, description, start_date, end_date) ",
        );
        query.push_values(chunk, |mut row, e| {
            row.push_bind(e.schedule_id)
                .push("'00000000-0000-0000-0000-000000000001'")
                .push_bind(&e.title)
                .push_bind(&e.description)
                .push_bind(e.start_date)
                .push_bind(e.end_date);
        });
        inserted += query.build().execute(&mut **tx).await?.rows_affected();
    }
    Ok(inserted)
}

/// Seeds schedules for `owner_ids`, overrides drawn from `user_ids`, and
/// events. Returns the new schedule ids.
pub async fn seed_schedules(
    db: &PgPool,
    owner_ids: &[Uuid],
    user_ids: &[Uuid],
    per_owner: usize,
    overrides_per_schedule: usize,
    events_per_schedule: usize,
) -> anyhow::Result<Vec<Uuid>> {
    let start_time = Instant::now();
    println!("📅 Seeding {} schedules...", owner_ids.len() * per_owner);

    let mut tx = db.begin().await?;

    let schedules = insert_schedules(&mut tx, &generate_schedules(owner_ids, per_owner)).await?;
    let overrides = insert_overrides(
        &mut tx,
        &generate_overrides(&schedules, user_ids, overrides_per_schedule),
    )
    .await?;

    let schedule_ids: Vec<Uuid> = schedules.iter().map(|(id, _)| *id).collect();
    let events = insert_events(&mut tx, &generate_events(&schedule_ids, events_per_schedule)).await?;

    tx.commit().await?;
    println!(
        "   ✓ Inserted {} schedules, {overrides} overrides and {events} events in {:?}",
        schedule_ids.len(),
        start_time.elapsed()
    );

    Ok(schedule_ids)
}
