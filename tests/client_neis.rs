// File: tests/client_neis.rs
use chrono::NaiveDate;
use mockito::{Matcher, Server};
use todaywhat::client::{FetchError, NeisClient};
use todaywhat::config::Config;
use todaywhat::model::{SchoolType, TimetablePeriod};

fn configured(base_url: &str) -> Config {
    Config {
        school_type: Some(SchoolType::High),
        school_code: "7010536".into(),
        org_code: "B10".into(),
        school_name: "한빛고등학교".into(),
        grade: 2,
        class_number: 3,
        api_key: "test-key".into(),
        base_url: base_url.to_string(),
        ..Config::default()
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

#[tokio::test]
async fn test_search_school_takes_first_candidate() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/hub/schoolInfo")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("KEY".into(), "test-key".into()),
            Matcher::UrlEncoded("Type".into(), "json".into()),
            Matcher::UrlEncoded("pIndex".into(), "1".into()),
            Matcher::UrlEncoded("pSize".into(), "3".into()),
            Matcher::UrlEncoded("SCHUL_NM".into(), "한빛".into()),
        ]))
        .match_header("user-agent", Matcher::Regex("^todaywhat/".into()))
        .with_status(200)
        .with_body(
            r#"{"schoolInfo":[
                {"head":[{"list_total_count":2},{"RESULT":{"CODE":"INFO-000","MESSAGE":"정상 처리되었습니다."}}]},
                {"row":[
                    {"ATPT_OFCDC_SC_CODE":"B10","SD_SCHUL_CODE":"7010536","SCHUL_NM":"한빛고등학교","SCHUL_KND_SC_NM":"고등학교"},
                    {"ATPT_OFCDC_SC_CODE":"J10","SD_SCHUL_CODE":"7530999","SCHUL_NM":"한빛중학교","SCHUL_KND_SC_NM":"중학교"}
                ]}
            ]}"#,
        )
        .create_async()
        .await;

    let client = NeisClient::new(&format!("{}/hub/", server.url()), "test-key").unwrap();
    let school = client.search_school("한빛").await.unwrap();

    assert_eq!(school.school_name, "한빛고등학교");
    assert_eq!(school.org_code, "B10");
    assert_eq!(school.school_code, "7010536");
    assert_eq!(school.school_type, SchoolType::High);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_search_school_empty_rows_is_not_found() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/hub/schoolInfo")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"schoolInfo":[{"head":[{"list_total_count":0}]},{"row":[]}]}"#)
        .create_async()
        .await;

    let client = NeisClient::new(&format!("{}/hub", server.url()), "").unwrap();
    assert_eq!(client.search_school("없는학교").await, Err(FetchError::NotFound));
}

#[tokio::test]
async fn test_result_envelope_and_http_errors_are_network_failures() {
    let mut server = Server::new_async().await;
    let _result = server
        .mock("GET", "/hub/schoolInfo")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"RESULT":{"CODE":"INFO-200","MESSAGE":"해당하는 데이터가 없습니다."}}"#)
        .create_async()
        .await;
    let _status = server
        .mock("GET", "/hub/mealServiceDietInfo")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let config = configured(&format!("{}/hub/", server.url()));
    let client = NeisClient::from_config(&config).unwrap();

    assert!(matches!(
        client.search_school("아무학교").await,
        Err(FetchError::NetworkFailure(_))
    ));
    assert!(matches!(
        client.fetch_meal_list(&config, date()).await,
        Err(FetchError::NetworkFailure(_))
    ));
}

#[tokio::test]
async fn test_fetch_meal_list_partitions_by_meal_type() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/hub/mealServiceDietInfo")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("pSize".into(), "30".into()),
            Matcher::UrlEncoded("ATPT_OFCDC_SC_CODE".into(), "B10".into()),
            Matcher::UrlEncoded("SD_SCHUL_CODE".into(), "7010536".into()),
            Matcher::UrlEncoded("MLSV_FROM_YMD".into(), "20240603".into()),
            Matcher::UrlEncoded("MLSV_TO_YMD".into(), "20240603".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"mealServiceDietInfo":[
                {"head":[{"list_total_count":3}]},
                {"row":[
                    {"MMEAL_SC_NM":"조식","DDISH_NM":"토스트 <br/>우유(200ml)"},
                    {"MMEAL_SC_NM":"중식","DDISH_NM":"쌀밥<br/>된장국 5.6.13.<br/>배추김치 9.13."},
                    {"MMEAL_SC_NM":"석식","DDISH_NM":"카레라이스1.2."}
                ]}
            ]}"#,
        )
        .create_async()
        .await;

    let config = configured(&format!("{}/hub/", server.url()));
    let client = NeisClient::from_config(&config).unwrap();
    let menu = client.fetch_meal_list(&config, date()).await.unwrap();

    assert_eq!(menu.breakfast, vec!["토스트", "우유(200ml)"]);
    assert_eq!(menu.lunch, vec!["쌀밥", "된장국5.6.13.", "배추김치9.13."]);
    assert_eq!(menu.dinner, vec!["카레라이스1.2."]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_timetable_uses_school_type_resource() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/hub/hisTimetable")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("GRADE".into(), "2".into()),
            Matcher::UrlEncoded("CLASS_NM".into(), "3".into()),
            Matcher::UrlEncoded("TI_FROM_YMD".into(), "20240603".into()),
            Matcher::UrlEncoded("TI_TO_YMD".into(), "20240603".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"hisTimetable":[
                {"head":[{"list_total_count":3}]},
                {"row":[
                    {"PERIO":"1","ITRT_CNTNT":"국어"},
                    {"PERIO":"2","ITRT_CNTNT":"수학"},
                    {"PERIO":"?","ITRT_CNTNT":"조회"}
                ]}
            ]}"#,
        )
        .create_async()
        .await;

    let config = configured(&format!("{}/hub/", server.url()));
    let client = NeisClient::from_config(&config).unwrap();
    let periods = client.fetch_timetable(&config, date()).await.unwrap();

    assert_eq!(
        periods,
        vec![
            TimetablePeriod::new(1, "국어"),
            TimetablePeriod::new(2, "수학"),
            TimetablePeriod::new(1, "조회"),
        ]
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_no_school_short_circuits_without_requests() {
    let mut server = Server::new_async().await;
    let meal = server
        .mock("GET", "/hub/mealServiceDietInfo")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let timetable = server
        .mock("GET", "/hub/hisTimetable")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let config = Config {
        base_url: format!("{}/hub/", server.url()),
        ..Config::default()
    };
    let client = NeisClient::from_config(&config).unwrap();

    let menu = client.fetch_meal_list(&config, date()).await.unwrap();
    assert!(menu.is_empty());
    assert!(client.fetch_timetable(&config, date()).await.unwrap().is_empty());

    meal.assert_async().await;
    timetable.assert_async().await;
}
