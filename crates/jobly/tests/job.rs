#[macro_use]
mod common;

use jobly::models::{Job, JobModel, NewJob};
use jobly::{FilterPayload, JoblyResult, UpdatePayload};
use rust_decimal::Decimal;
use std::str::FromStr;

fn new_job(company: &str) -> NewJob {
    NewJob {
        title: "New".to_string(),
        salary: Some(50000),
        equity: Some(Decimal::from_str("0.1").unwrap()),
        company_handle: company.to_string(),
    }
}

fn titles(jobs: &[Job]) -> Vec<&str> {
    jobs.iter().map(|j| j.title.as_str()).collect()
}

#[tokio::test]
async fn create_assigns_id() -> JoblyResult<()> {
    fixture!(client, fx, "create_assigns_id");
    let model = JobModel::default();

    let job = model.create(&fx.tx, &new_job("c3")).await?;
    assert!(job.id > fx.job_ids[1]);
    assert_eq!(job.title, "New");
    assert_eq!(job.company_handle, "c3");
    assert_eq!(job.equity, Some(Decimal::from_str("0.1").unwrap()));
    Ok(())
}

#[tokio::test]
async fn create_for_unknown_company_is_bad_request() -> JoblyResult<()> {
    fixture!(client, fx, "create_for_unknown_company_is_bad_request");

    let err = JobModel::default()
        .create(&fx.tx, &new_job("nope"))
        .await
        .unwrap_err();
    assert!(err.is_bad_request());
    assert!(err.to_string().contains("Company handle doesn't exist: nope"));
    Ok(())
}

#[tokio::test]
async fn find_all_orders_by_id() -> JoblyResult<()> {
    fixture!(client, fx, "find_all_orders_by_id");

    let jobs = JobModel::default().find_all(&fx.tx).await?;
    assert_eq!(
        jobs,
        [
            Job {
                id: fx.job_ids[0],
                title: "T1".to_string(),
                salary: Some(10000),
                equity: Some(Decimal::from_str("0.2").unwrap()),
                company_handle: "c1".to_string(),
            },
            Job {
                id: fx.job_ids[1],
                title: "T2".to_string(),
                salary: Some(20000),
                equity: Some(Decimal::ZERO),
                company_handle: "c2".to_string(),
            },
        ]
    );
    Ok(())
}

#[tokio::test]
async fn find_some_by_title_and_salary() -> JoblyResult<()> {
    fixture!(client, fx, "find_some_by_title_and_salary");
    let model = JobModel::default();

    let found = model
        .find_some(&fx.tx, &FilterPayload::new().with("title", "t"))
        .await?;
    assert_eq!(titles(&found), ["T1", "T2"]);

    let found = model
        .find_some(&fx.tx, &FilterPayload::from_query_pairs([("minSalary", "15000")]))
        .await?;
    assert_eq!(titles(&found), ["T2"]);
    Ok(())
}

#[tokio::test]
async fn find_some_has_equity() -> JoblyResult<()> {
    fixture!(client, fx, "find_some_has_equity");
    let model = JobModel::default();

    let found = model
        .find_some(&fx.tx, &FilterPayload::new().with("hasEquity", true))
        .await?;
    assert_eq!(titles(&found), ["T1"]);

    let found = model
        .find_some(&fx.tx, &FilterPayload::new().with("hasEquity", false))
        .await?;
    assert_eq!(titles(&found), ["T1", "T2"]);
    Ok(())
}

#[tokio::test]
async fn find_some_rejects_company_filters() -> JoblyResult<()> {
    fixture!(client, fx, "find_some_rejects_company_filters");

    let err = JobModel::default()
        .find_some(&fx.tx, &FilterPayload::new().with("minEmployees", 1))
        .await
        .unwrap_err();
    assert!(err.is_bad_request());
    assert!(err.to_string().contains("Unsupported filter: minEmployees"));
    Ok(())
}

#[tokio::test]
async fn get_includes_company() -> JoblyResult<()> {
    fixture!(client, fx, "get_includes_company");

    let detail = JobModel::default().get(&fx.tx, fx.job_ids[0]).await?;
    assert_eq!(detail.title, "T1");
    assert_eq!(detail.company.handle, "c1");
    assert_eq!(detail.company.num_employees, Some(1));
    Ok(())
}

#[tokio::test]
async fn get_missing_is_not_found() -> JoblyResult<()> {
    fixture!(client, fx, "get_missing_is_not_found");

    let err = JobModel::default().get(&fx.tx, 0).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("No job: 0"));
    Ok(())
}

#[tokio::test]
async fn update_changes_only_given_fields() -> JoblyResult<()> {
    fixture!(client, fx, "update_changes_only_given_fields");

    let payload = UpdatePayload::new().set("title", "Updated").set("equity", 0.5);
    let job = JobModel::default()
        .update(&fx.tx, fx.job_ids[0], &payload)
        .await?;
    assert_eq!(job.title, "Updated");
    assert_eq!(job.salary, Some(10000));
    assert_eq!(job.equity, Some(Decimal::from_str("0.5").unwrap()));
    assert_eq!(job.company_handle, "c1");
    Ok(())
}

#[tokio::test]
async fn update_cannot_move_job() -> JoblyResult<()> {
    fixture!(client, fx, "update_cannot_move_job");

    let err = JobModel::default()
        .update(
            &fx.tx,
            fx.job_ids[0],
            &UpdatePayload::new().set("companyHandle", "c2"),
        )
        .await
        .unwrap_err();
    assert!(err.is_bad_request());
    Ok(())
}

#[tokio::test]
async fn update_missing_is_not_found() -> JoblyResult<()> {
    fixture!(client, fx, "update_missing_is_not_found");

    let err = JobModel::default()
        .update(&fx.tx, 0, &UpdatePayload::new().set("title", "x"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn remove_deletes_job() -> JoblyResult<()> {
    fixture!(client, fx, "remove_deletes_job");
    let model = JobModel::default();

    model.remove(&fx.tx, fx.job_ids[0]).await?;
    assert_eq!(titles(&model.find_all(&fx.tx).await?), ["T2"]);
    assert!(
        model
            .remove(&fx.tx, fx.job_ids[0])
            .await
            .unwrap_err()
            .is_not_found()
    );
    Ok(())
}
