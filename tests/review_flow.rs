use spanmark::{
    decode_region_conf, read_regions, RenderConfigBuilder, ReviewDecision, ReviewStore, SpanKey,
    Verdict, VerdictVocabulary,
};

/// Walks a whole review session the way the display glue does: load the record store, decode
/// every region, key every span, record verdicts and export them.
#[test]
fn full_review_session() {
    let regions = read_regions("tests/regions.jsonl").expect("file regions.jsonl not found");
    assert_eq!(regions.len(), 4);

    let config = RenderConfigBuilder::default()
        .vocabulary(VerdictVocabulary::CorrectWrong)
        .build();
    let mut store = ReviewStore::new(config.vocabulary());

    for (region_index, region) in regions.iter().enumerate() {
        for decoded in decode_region_conf(region, &config) {
            // Every chunk reproduces its token sequence through its rendering units.
            let recovered: Vec<&str> = decoded
                .units
                .iter()
                .flat_map(|unit| unit.text().split(' '))
                .collect();
            let expected: Vec<&str> = region.words().iter().map(|w| w.as_str()).collect();
            assert_eq!(recovered, expected);

            for (span_index, span) in decoded.spans.iter().enumerate() {
                let key = SpanKey {
                    file: String::from("3604"),
                    region: region_index,
                    chunk: decoded.chunk,
                    span: span_index,
                };
                let verdict = if span.label == "DATE" {
                    Verdict::Reject
                } else {
                    Verdict::Accept
                };
                store.record(
                    key,
                    ReviewDecision {
                        text: span.text.clone(),
                        label: span.label.clone(),
                        verdict,
                    },
                );
            }
        }
    }

    // Two spans in region 0, two in region 1, none in region 2, one in region 3.
    assert_eq!(store.len(), 5);

    let mut buffer = Vec::new();
    store.export_csv(&mut buffer).unwrap();
    let exported = String::from_utf8(buffer).unwrap();
    let expected = "\
file,region,chunk,text,label,verdict
3604,0,,VOC ship,ORG,correct
3604,0,,Batavia,LOC,correct
3604,1,,Batavia,LOC,correct
3604,1,,1782,DATE,wrong
3604,3,,eight hundred rixdollars,AMOUNT,correct
";
    assert_eq!(exported, expected);
}

#[test]
fn rerendering_yields_identical_keys() {
    let regions = read_regions("tests/regions.jsonl").expect("file regions.jsonl not found");
    let config = RenderConfigBuilder::default().build();
    for region in &regions {
        let first_pass = decode_region_conf(region, &config);
        let second_pass = decode_region_conf(region, &config);
        assert_eq!(first_pass, second_pass);
    }
}
