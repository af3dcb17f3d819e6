use chrono::Utc;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    Amount, Contribution, PaymentConfirmation, PaymentOutcome, PhoneNumber, Settlement,
};

fn pending_contribution() -> Contribution {
    Contribution::pending(
        "Bench Contributor",
        PhoneNumber::parse("0712345678").unwrap(),
        Some("bench@example.com".to_string()),
        Amount::from_kes(500),
    )
}

fn success_outcome() -> PaymentOutcome {
    PaymentOutcome::Success(PaymentConfirmation {
        amount: Some(Amount::from_kes(500)),
        receipt: Some("QAX123".to_string()),
        phone: Some(PhoneNumber::parse("0712345678").unwrap()),
    })
}

fn bench_phone_parse(c: &mut Criterion) {
    c.bench_function("domain/phone_parse", |b| {
        b.iter(|| {
            PhoneNumber::parse("+254712345678").unwrap();
            PhoneNumber::parse("0712345678").unwrap();
            PhoneNumber::parse("254712345678").unwrap();
        });
    });
}

fn bench_settle_decision(c: &mut Criterion) {
    let contribution = pending_contribution();
    let outcome = success_outcome();

    c.bench_function("domain/settle_decision", |b| {
        b.iter(|| contribution.settle(&outcome));
    });
}

fn bench_settle_and_apply(c: &mut Criterion) {
    let outcome = success_outcome();

    c.bench_function("domain/settle_and_apply", |b| {
        b.iter(|| {
            let mut contribution = pending_contribution();
            if let Settlement::Apply(update) = contribution.settle(&outcome) {
                contribution.apply_update(&update, Utc::now());
            }
            contribution
        });
    });
}

criterion_group!(
    benches,
    bench_phone_parse,
    bench_settle_decision,
    bench_settle_and_apply
);
criterion_main!(benches);
