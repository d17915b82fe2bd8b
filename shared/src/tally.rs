use std::collections::HashMap;
use crate::models::{CounterMismatch, Survey, SurveyParticipation};

/// Returns a copy of `survey` whose counters are rebuilt from scratch by
/// replaying `participations`. Participations for other surveys are skipped.
pub fn recount(survey: &Survey, participations: &[SurveyParticipation]) -> Survey {
    let mut replayed = survey.clone();
    replayed.reset_counters();

    participations.iter()
        .filter(|p| p.survey_id == survey.id)
        .for_each(|p| {
            replayed.apply_selections(&p.answers);
        });

    replayed
}

/// Lists every answer whose counter differs between `stored` and `replayed`.
pub fn mismatches(stored: &Survey, replayed: &Survey) -> Vec<CounterMismatch> {
    let replayed_counters: HashMap<(i64, i64), u64> = replayed.questions.iter()
        .flat_map(|q| q.answers.iter().map(move |a| ((q.id, a.id), a.counter)))
        .collect();

    stored.questions.iter()
        .flat_map(|q| q.answers.iter().map(move |a| (q.id, a)))
        .filter_map(|(question_id, answer)| {
            let replayed = replayed_counters.get(&(question_id, answer.id)).copied().unwrap_or(0);
            (replayed != answer.counter).then(|| CounterMismatch {
                question_id,
                answer_id: answer.id,
                stored: answer.counter,
                replayed,
            })
        })
        .collect()
}

/// Number of counted selections per question id.
pub fn totals(survey: &Survey) -> HashMap<i64, u64> {
    survey.questions.iter()
        .map(|q| (q.id, q.total_votes()))
        .collect()
}
