#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use rocket::async_trait;
    use rocket::http::{Header, Status};
    use rocket::local::asynchronous::Client;
    use shared::credentials::BasicCredentials;
    use shared::models::*;
    use shared::validation::{ValidationError, VoteParsing};
    use shared::{Error as ErrorBody, ErrorCode};
    use crate::build_rocket;
    use crate::config::{AdminCredentials, AppConfig, ConfigError};
    use crate::identity::{IdentityResolver, RESPONDENT_COOKIE};
    use crate::processor::{VoteError, VotePolicy, VoteProcessor};
    use crate::queries::participation_filter;
    use crate::routes::AppState;
    use crate::store::{MemoryStore, RespondentStore, StoreError, SurveyStore};

    fn yes_no_survey() -> Survey {
        Survey {
            id: String::new(),
            title: "Ship it?".into(),
            questions: vec![
                Question {
                    id: 1,
                    title: "Release this week".into(),
                    exclusive: true,
                    answers: vec![
                        Answer { id: 0, text: "Yes".into(), counter: 0 },
                        Answer { id: 1, text: "No".into(), counter: 0 },
                    ],
                },
                Question {
                    id: 4,
                    title: "Platforms".into(),
                    exclusive: false,
                    answers: vec![
                        Answer { id: 0, text: "Linux".into(), counter: 0 },
                        Answer { id: 1, text: "macOS".into(), counter: 0 },
                        Answer { id: 2, text: "Windows".into(), counter: 0 },
                    ],
                },
            ],
            revision: 0,
        }
    }

    fn vote(pairs: &[(&str, &str)]) -> Vec<VoteEntry> {
        pairs.iter().map(|&(name, value)| VoteEntry::new(name, value)).collect()
    }

    async fn seeded() -> (Arc<MemoryStore>, String) {
        let store = Arc::new(MemoryStore::new());
        let id = SurveyStore::insert(store.as_ref(), &yes_no_survey()).await.unwrap();
        (store, id)
    }

    async fn new_respondent(store: &MemoryStore) -> Respondent {
        IdentityResolver::new(store).resolve(None).await.unwrap().respondent
    }

    async fn counter(store: &MemoryStore, survey_id: &str, question_id: i64, answer_id: i64) -> u64 {
        let survey = SurveyStore::get(store, survey_id).await.unwrap();
        survey.question(question_id).and_then(|q| q.answer(answer_id)).unwrap().counter
    }

    fn processor(store: &MemoryStore) -> VoteProcessor<'_> {
        VoteProcessor::new(store, store, VotePolicy::default())
    }

    /// Lets a rival writer commit a vote for answer (1, 0) right before the
    /// first replace goes through.
    struct ContendedSurveys {
        inner: Arc<MemoryStore>,
        interfere: AtomicBool,
    }

    #[async_trait]
    impl SurveyStore for ContendedSurveys {
        async fn get(&self, id: &str) -> Result<Survey, StoreError> {
            SurveyStore::get(self.inner.as_ref(), id).await
        }

        async fn list(&self) -> Result<Vec<Survey>, StoreError> {
            SurveyStore::list(self.inner.as_ref()).await
        }

        async fn insert(&self, survey: &Survey) -> Result<String, StoreError> {
            SurveyStore::insert(self.inner.as_ref(), survey).await
        }

        async fn replace(&self, survey: &Survey) -> Result<(), StoreError> {
            if self.interfere.swap(false, Ordering::SeqCst) {
                let mut rival = SurveyStore::get(self.inner.as_ref(), &survey.id).await?;
                rival.apply_selections(&[SelectedAnswer::new(1, 0)]);
                SurveyStore::replace(self.inner.as_ref(), &rival).await?;
            }
            SurveyStore::replace(self.inner.as_ref(), survey).await
        }
    }

    /// Every replace loses the race.
    struct StarvedSurveys {
        inner: Arc<MemoryStore>,
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl SurveyStore for StarvedSurveys {
        async fn get(&self, id: &str) -> Result<Survey, StoreError> {
            SurveyStore::get(self.inner.as_ref(), id).await
        }

        async fn list(&self) -> Result<Vec<Survey>, StoreError> {
            SurveyStore::list(self.inner.as_ref()).await
        }

        async fn insert(&self, survey: &Survey) -> Result<String, StoreError> {
            SurveyStore::insert(self.inner.as_ref(), survey).await
        }

        async fn replace(&self, _survey: &Survey) -> Result<(), StoreError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Conflict)
        }
    }

    /// Counts inserts so the resolver's write behaviour can be checked.
    #[derive(Default)]
    struct CountingRespondents {
        inner: MemoryStore,
        inserts: AtomicUsize,
    }

    #[async_trait]
    impl RespondentStore for CountingRespondents {
        async fn get(&self, id: &str) -> Result<Respondent, StoreError> {
            RespondentStore::get(&self.inner, id).await
        }

        async fn insert(&self, respondent: &Respondent) -> Result<String, StoreError> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            RespondentStore::insert(&self.inner, respondent).await
        }

        async fn replace(&self, respondent: &Respondent) -> Result<(), StoreError> {
            RespondentStore::replace(&self.inner, respondent).await
        }

        async fn participations(&self, survey_id: &str) -> Result<Vec<SurveyParticipation>, StoreError> {
            RespondentStore::participations(&self.inner, survey_id).await
        }
    }

    #[tokio::test]
    async fn test_vote_then_duplicate_then_second_respondent() {
        let (store, survey_id) = seeded().await;
        let r1 = new_respondent(&store).await;
        let payload = vote(&[("1", "0")]);

        let result = processor(&store).submit_vote(&survey_id, r1.clone(), &payload).await.unwrap();
        assert!(result.accepted);
        assert_eq!(result.echo, payload);
        assert_eq!(counter(&store, &survey_id, 1, 0).await, 1);

        let r1 = RespondentStore::get(store.as_ref(), &r1.id).await.unwrap();
        assert!(matches!(
            processor(&store).submit_vote(&survey_id, r1, &vote(&[("1", "1")])).await,
            Err(VoteError::DuplicateVote)
        ));
        assert_eq!(counter(&store, &survey_id, 1, 0).await, 1);
        assert_eq!(counter(&store, &survey_id, 1, 1).await, 0);

        let r2 = new_respondent(&store).await;
        processor(&store).submit_vote(&survey_id, r2, &payload).await.unwrap();
        assert_eq!(counter(&store, &survey_id, 1, 0).await, 2);
    }

    #[tokio::test]
    async fn test_participation_is_recorded_with_submitted_pairs() {
        let (store, survey_id) = seeded().await;
        let respondent = new_respondent(&store).await;

        processor(&store)
            .submit_vote(&survey_id, respondent.clone(), &vote(&[("4", "2"), ("9", "0"), ("4", "7")]))
            .await
            .unwrap();

        let stored = RespondentStore::get(store.as_ref(), &respondent.id).await.unwrap();
        let participation = stored.participation(&survey_id).unwrap();
        assert_eq!(participation.answers, vec![
            SelectedAnswer::new(4, 2),
            SelectedAnswer::new(9, 0),
            SelectedAnswer::new(4, 7),
        ]);
        assert_eq!(counter(&store, &survey_id, 4, 2).await, 1);
        assert_eq!(counter(&store, &survey_id, 4, 0).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_survey_is_rejected_before_mutation() {
        let store = MemoryStore::new();
        let respondent = new_respondent(&store).await;

        assert!(matches!(
            processor(&store).submit_vote("missing", respondent.clone(), &vote(&[("1", "0")])).await,
            Err(VoteError::NotFound)
        ));
        let stored = RespondentStore::get(&store, &respondent.id).await.unwrap();
        assert!(stored.participations.is_empty());
        assert_eq!(stored.revision, 0);
    }

    #[tokio::test]
    async fn test_lenient_and_strict_parsing() {
        let (store, survey_id) = seeded().await;
        let payload = vote(&[("1", "0"), ("platform", "linux")]);

        let strict = VotePolicy { parsing: VoteParsing::Strict, ..VotePolicy::default() };
        let respondent = new_respondent(&store).await;
        let err = VoteProcessor::new(store.as_ref(), store.as_ref(), strict)
            .submit_vote(&survey_id, respondent.clone(), &payload)
            .await;
        assert!(matches!(err, Err(VoteError::Validation(ValidationError::MalformedEntry { .. }))));
        assert_eq!(counter(&store, &survey_id, 1, 0).await, 0);
        assert!(!RespondentStore::get(store.as_ref(), &respondent.id).await.unwrap().has_participated(&survey_id));

        processor(&store).submit_vote(&survey_id, respondent, &payload).await.unwrap();
        assert_eq!(counter(&store, &survey_id, 1, 0).await, 1);
    }

    #[tokio::test]
    async fn test_exclusive_question_accepts_one_answer() {
        let (store, survey_id) = seeded().await;
        let payload = vote(&[("1", "0"), ("1", "1")]);

        let respondent = new_respondent(&store).await;
        assert!(matches!(
            processor(&store).submit_vote(&survey_id, respondent, &payload).await,
            Err(VoteError::Validation(ValidationError::ExclusiveViolation(1)))
        ));

        let informational = VotePolicy { enforce_exclusive: false, ..VotePolicy::default() };
        let respondent = new_respondent(&store).await;
        VoteProcessor::new(store.as_ref(), store.as_ref(), informational)
            .submit_vote(&survey_id, respondent, &payload)
            .await
            .unwrap();
        assert_eq!(counter(&store, &survey_id, 1, 0).await, 1);
        assert_eq!(counter(&store, &survey_id, 1, 1).await, 1);
    }

    #[tokio::test]
    async fn test_exclusive_question_ignores_unknown_answers() {
        let (store, survey_id) = seeded().await;
        let respondent = new_respondent(&store).await;

        processor(&store)
            .submit_vote(&survey_id, respondent.clone(), &vote(&[("1", "0"), ("1", "99")]))
            .await
            .unwrap();

        assert_eq!(counter(&store, &survey_id, 1, 0).await, 1);
        assert_eq!(counter(&store, &survey_id, 1, 1).await, 0);
        let stored = RespondentStore::get(store.as_ref(), &respondent.id).await.unwrap();
        assert_eq!(stored.participation(&survey_id).unwrap().answers, vec![
            SelectedAnswer::new(1, 0),
            SelectedAnswer::new(1, 99),
        ]);
    }

    #[tokio::test]
    async fn test_multiple_answers_on_open_question() {
        let (store, survey_id) = seeded().await;
        let respondent = new_respondent(&store).await;

        processor(&store)
            .submit_vote(&survey_id, respondent, &vote(&[("4", "0"), ("4", "2"), ("4", "0")]))
            .await
            .unwrap();
        assert_eq!(counter(&store, &survey_id, 4, 0).await, 1);
        assert_eq!(counter(&store, &survey_id, 4, 2).await, 1);
    }

    #[tokio::test]
    async fn test_stale_respondent_cannot_vote_twice() {
        let (store, survey_id) = seeded().await;
        let respondent = new_respondent(&store).await;

        processor(&store).submit_vote(&survey_id, respondent.clone(), &vote(&[("1", "0")])).await.unwrap();
        // Same snapshot again, as a second in-flight request would hold it.
        assert!(matches!(
            processor(&store).submit_vote(&survey_id, respondent, &vote(&[("1", "1")])).await,
            Err(VoteError::DuplicateVote)
        ));
        assert_eq!(counter(&store, &survey_id, 1, 0).await, 1);
        assert_eq!(counter(&store, &survey_id, 1, 1).await, 0);
    }

    #[tokio::test]
    async fn test_conflicting_survey_write_is_retried() {
        let (store, survey_id) = seeded().await;
        let contended = ContendedSurveys { inner: store.clone(), interfere: AtomicBool::new(true) };
        let respondent = new_respondent(&store).await;

        VoteProcessor::new(&contended, store.as_ref(), VotePolicy::default())
            .submit_vote(&survey_id, respondent, &vote(&[("1", "0")]))
            .await
            .unwrap();

        assert_eq!(counter(&store, &survey_id, 1, 0).await, 2);
        assert_eq!(SurveyStore::get(store.as_ref(), &survey_id).await.unwrap().revision, 2);
    }

    #[tokio::test]
    async fn test_exhausted_retries_surface_persistence_error() {
        let (store, survey_id) = seeded().await;
        let starved = StarvedSurveys { inner: store.clone(), attempts: AtomicUsize::new(0) };
        let policy = VotePolicy { commit_attempts: 3, ..VotePolicy::default() };
        let respondent = new_respondent(&store).await;

        let result = VoteProcessor::new(&starved, store.as_ref(), policy)
            .submit_vote(&survey_id, respondent, &vote(&[("1", "0")]))
            .await;
        assert!(matches!(result, Err(VoteError::Persistence(StoreError::Conflict))));
        assert_eq!(starved.attempts.load(Ordering::SeqCst), 3);

        // The participation landed but the counter did not; the audit sees it.
        let report = processor(&store).audit(&survey_id).await.unwrap();
        assert!(!report.consistent);
        assert_eq!(report.participations, 1);
        assert_eq!(report.mismatches, vec![CounterMismatch {
            question_id: 1,
            answer_id: 0,
            stored: 0,
            replayed: 1,
        }]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_votes_are_not_lost() {
        let (store, survey_id) = seeded().await;
        let policy = VotePolicy { commit_attempts: 1_000, ..VotePolicy::default() };

        let handles = (0..40).map(|i| {
            let store = store.clone();
            let survey_id = survey_id.clone();
            tokio::spawn(async move {
                let respondent = new_respondent(&store).await;
                let answer = if i % 4 == 0 { "1" } else { "0" };
                VoteProcessor::new(store.as_ref(), store.as_ref(), policy)
                    .submit_vote(&survey_id, respondent, &vote(&[("1", answer), ("4", "2")]))
                    .await
            })
        });

        for result in futures::future::join_all(handles).await {
            result.unwrap().unwrap();
        }

        assert_eq!(counter(&store, &survey_id, 1, 0).await, 30);
        assert_eq!(counter(&store, &survey_id, 1, 1).await, 10);
        assert_eq!(counter(&store, &survey_id, 4, 2).await, 40);
        assert!(processor(&store).audit(&survey_id).await.unwrap().consistent);
    }

    #[tokio::test]
    async fn test_counters_match_replayed_participations() {
        let (store, survey_id) = seeded().await;
        let ballots: Vec<Vec<VoteEntry>> = (0..12)
            .map(|i: usize| {
                let first = (i % 2).to_string();
                let second = (i % 3).to_string();
                vote(&[("1", first.as_str()), ("4", second.as_str()), ("4", "1")])
            })
            .collect();

        for ballot in &ballots {
            let respondent = new_respondent(&store).await;
            processor(&store).submit_vote(&survey_id, respondent, ballot).await.unwrap();
        }

        assert_eq!(counter(&store, &survey_id, 1, 0).await, 6);
        assert_eq!(counter(&store, &survey_id, 1, 1).await, 6);
        assert_eq!(counter(&store, &survey_id, 4, 0).await, 4);
        assert_eq!(counter(&store, &survey_id, 4, 1).await, 12);
        assert_eq!(counter(&store, &survey_id, 4, 2).await, 4);

        let report = processor(&store).audit(&survey_id).await.unwrap();
        assert!(report.consistent);
        assert_eq!(report.participations, 12);

        let review = VoteProcessor::review(&SurveyStore::get(store.as_ref(), &survey_id).await.unwrap());
        let totals: Vec<u64> = review.charts.iter().map(|c| c.total_votes).collect();
        assert_eq!(totals, vec![12, 20]);
    }

    #[test]
    fn test_participation_filter_matches_stored_json() {
        let stored = serde_json::to_value(vec![
            SurveyParticipation::new("S1", vec![SelectedAnswer::new(1, 0)]),
        ]).unwrap();
        let filter = participation_filter("S1");

        let wanted = filter[0].as_object().unwrap();
        let row = stored[0].as_object().unwrap();
        assert!(!wanted.is_empty());
        for (key, value) in wanted {
            assert_eq!(row.get(key), Some(value), "filter key {} not in stored participation", key);
        }
        assert_ne!(participation_filter("S2")[0], filter[0]);
    }

    #[tokio::test]
    async fn test_survey_list_is_ordered_by_title() {
        let store = MemoryStore::new();
        for title in ["beta", "alpha", "Gamma"] {
            let survey = Survey { title: title.into(), ..yes_no_survey() };
            SurveyStore::insert(&store, &survey).await.unwrap();
        }

        let titles: Vec<String> = processor(&store).list_surveys().await.unwrap()
            .into_iter()
            .map(|entry| entry.title)
            .collect();
        assert_eq!(titles, vec!["Gamma", "alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_identity_resolution() {
        let respondents = CountingRespondents::default();
        let resolver = IdentityResolver::new(&respondents);

        let created = resolver.resolve(None).await.unwrap();
        let token = created.new_token.clone().unwrap();
        assert_eq!(created.respondent.id, token);
        assert!(created.respondent.participations.is_empty());
        assert_eq!(respondents.inserts.load(Ordering::SeqCst), 1);

        let first = resolver.resolve(Some(token.as_str())).await.unwrap();
        let second = resolver.resolve(Some(token.as_str())).await.unwrap();
        assert_eq!(first.respondent.id, token);
        assert_eq!(second.respondent.id, token);
        assert_eq!(first.new_token, None);
        assert_eq!(respondents.inserts.load(Ordering::SeqCst), 1);

        let unknown = resolver.resolve(Some("no-such-respondent")).await.unwrap();
        let anonymous = resolver.resolve(None).await.unwrap();
        assert!(unknown.new_token.is_some());
        assert!(anonymous.new_token.is_some());
        assert_ne!(unknown.respondent.id, anonymous.respondent.id);
        assert_ne!(unknown.respondent.id, token);
        assert_eq!(respondents.inserts.load(Ordering::SeqCst), 3);
    }

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
    }

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.admin.is_none());
        assert_eq!(config.poll.questions, 5);
        assert_eq!(config.poll.answers, 4);
        assert_eq!(config.policy, VotePolicy::default());
    }

    #[test]
    fn test_config_values() {
        let config = AppConfig::from_lookup(lookup(&[
            ("ADMIN_USER", "admin"),
            ("ADMIN_PASSWORD", "hunter2"),
            ("POLL_QUESTIONS", "3"),
            ("POLL_ANSWERS", "6"),
            ("VOTE_PARSING", "strict"),
            ("ENFORCE_EXCLUSIVE", "false"),
        ])).unwrap();

        let admin = config.admin.unwrap();
        assert!(admin.verify(&BasicCredentials::new("admin", "hunter2")));
        assert!(!admin.verify(&BasicCredentials::new("admin", "hunter3")));
        assert!(!admin.verify(&BasicCredentials::new("root", "hunter2")));
        assert_eq!(config.poll.questions, 3);
        assert_eq!(config.poll.answers, 6);
        assert_eq!(config.policy.parsing, VoteParsing::Strict);
        assert!(!config.policy.enforce_exclusive);
    }

    #[test]
    fn test_config_errors() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("POLL_QUESTIONS", "0")])),
            Err(ConfigError::OutOfRange { key: "POLL_QUESTIONS", .. })
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("VOTE_PARSING", "loose")])),
            Err(ConfigError::Invalid { key: "VOTE_PARSING", .. })
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("ENFORCE_EXCLUSIVE", "sometimes")])),
            Err(ConfigError::Invalid { key: "ENFORCE_EXCLUSIVE", .. })
        ));
    }

    async fn client_with(store: Arc<MemoryStore>) -> Client {
        let config = AppConfig {
            admin: Some(AdminCredentials::new("admin", "secret")),
            ..AppConfig::default()
        };
        let state = AppState::new(store.clone(), store, config);
        Client::tracked(build_rocket(state)).await.expect("valid rocket instance")
    }

    fn admin_auth() -> Header<'static> {
        Header::new("Authorization", BasicCredentials::new("admin", "secret").to_header())
    }

    #[rocket::async_test]
    async fn test_http_vote_flow() {
        let (store, survey_id) = seeded().await;
        let client = client_with(store.clone()).await;

        let view = client.get(format!("/api/survey/{}", survey_id)).dispatch().await;
        assert_eq!(view.status(), Status::Ok);
        let view: SurveyView = view.into_json().await.unwrap();
        assert_eq!(view.questions.len(), 2);
        assert_eq!(view.vote_link, format!("/api/vote/{}", survey_id));

        let payload = vote(&[("1", "0"), ("4", "1")]);
        let response = client.post(format!("/api/vote/{}", survey_id))
            .json(&payload)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let token = response.cookies().get(RESPONDENT_COOKIE).map(|c| c.value().to_string()).unwrap();
        assert_eq!(response.into_json::<Vec<VoteEntry>>().await.unwrap(), payload);
        assert!(RespondentStore::get(store.as_ref(), &token).await.unwrap().has_participated(&survey_id));
        assert_eq!(counter(&store, &survey_id, 4, 1).await, 1);

        // The tracked client sends the cookie back.
        let again = client.post(format!("/api/vote/{}", survey_id))
            .json(&payload)
            .dispatch()
            .await;
        assert_eq!(again.status(), Status::Forbidden);
        let body: ErrorBody = again.into_json().await.unwrap();
        assert_eq!(body.code, ErrorCode::AlreadyVoted);
        assert_eq!(counter(&store, &survey_id, 1, 0).await, 1);
    }

    #[rocket::async_test]
    async fn test_http_vote_errors() {
        let (store, _) = seeded().await;
        let client = client_with(store).await;

        let response = client.post("/api/vote/not-a-uuid")
            .json(&vote(&[("1", "0")]))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);

        let response = client.post(format!("/api/vote/{}", uuid::Uuid::new_v4()))
            .json(&vote(&[("1", "0")]))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);

        let response = client.get(format!("/api/survey/{}", uuid::Uuid::new_v4())).dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn test_http_exclusive_violation() {
        let (store, survey_id) = seeded().await;
        let client = client_with(store.clone()).await;

        let response = client.post(format!("/api/vote/{}", survey_id))
            .json(&vote(&[("1", "0"), ("1", "1")]))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::UnprocessableEntity);
        let body: ErrorBody = response.into_json().await.unwrap();
        assert_eq!(body.code, ErrorCode::ValidationFailed);
        assert_eq!(counter(&store, &survey_id, 1, 0).await, 0);
    }

    #[rocket::async_test]
    async fn test_http_admin_requires_credentials() {
        let (store, _) = seeded().await;
        let client = client_with(store).await;

        let response = client.get("/api/admin/surveys").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);
        assert_eq!(response.headers().get_one("WWW-Authenticate"), Some(r#"Basic realm="Restricted""#));

        let wrong = Header::new("Authorization", BasicCredentials::new("admin", "guess").to_header());
        let response = client.get("/api/admin/surveys").header(wrong).dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[rocket::async_test]
    async fn test_http_admin_flow() {
        let store = Arc::new(MemoryStore::new());
        let client = client_with(store.clone()).await;

        let form: CreateSurveyForm = client.get("/api/admin/create")
            .header(admin_auth())
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(form.questions.len(), 5);
        assert_eq!(form.questions[0].answers, vec![0, 1, 2, 3]);

        let created = client.post("/api/admin/create")
            .header(admin_auth())
            .json(&vote(&[
                ("survey", "Retro"),
                ("question:0", "Mood"),
                ("excl:0", "true"),
                ("0", "Good"),
                ("0", "Bad"),
                ("1", ""),
            ]))
            .dispatch()
            .await;
        assert_eq!(created.status(), Status::Ok);
        let survey: Survey = created.into_json().await.unwrap();
        assert_eq!(survey.questions.len(), 1);
        assert!(survey.questions[0].exclusive);

        let list: Vec<SurveyListEntry> = client.get("/api/admin/surveys")
            .header(admin_auth())
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].survey_link, format!("/api/survey/{}", survey.id));

        let response = client.post(format!("/api/vote/{}", survey.id))
            .json(&vote(&[("0", "1")]))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let review: SurveyReview = client.get(format!("/api/admin/survey/{}", survey.id))
            .header(admin_auth())
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(review.charts, vec![ChartHeading { id: 0, title: "Mood".into(), total_votes: 1 }]);

        let chart: ChartPage = client.get(format!("/api/chart/{}", survey.id))
            .header(admin_auth())
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        let dataset = &chart.dataset[0].data;
        assert_eq!(dataset.labels, vec!["Good".to_string(), "Bad".to_string()]);
        assert_eq!(dataset.datasets[0].data, vec![0, 1]);
        assert_eq!(dataset.datasets[0].background_color.len(), 2);

        let audit: AuditReport = client.get(format!("/api/admin/survey/{}/audit", survey.id))
            .header(admin_auth())
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert!(audit.consistent);
        assert_eq!(audit.participations, 1);
    }

    #[rocket::async_test]
    async fn test_http_invalid_survey_form() {
        let store = Arc::new(MemoryStore::new());
        let client = client_with(store.clone()).await;

        let response = client.post("/api/admin/create")
            .header(admin_auth())
            .json(&vote(&[("question:0", "Untitled survey"), ("0", "A")]))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::UnprocessableEntity);
        assert!(SurveyStore::list(store.as_ref()).await.unwrap().is_empty());
    }
}
