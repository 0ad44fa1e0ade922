// Integration test: train a real candle classifier end to end
// Verifies that validation loss improves, the model is saved, and a
// reloaded model predicts the same classes.

use anyhow::Result;
use candle_core::{Device, Tensor};
use classifier_trainer::data::{ImageDataset, InMemoryLoader, Sample};
use classifier_trainer::models::{model_exists, ClassifierConfig, ImageClassifier, UniModel};
use classifier_trainer::training::{ChannelSink, TrainingDriver, TrainingEvent};
use classifier_trainer::TrainArgs;
use tempfile::TempDir;

/// Two separable classes: images filled with negative values are class 0,
/// positive values class 1
fn separable_samples(n: usize, device: &Device) -> Result<Vec<Sample>> {
    (0..n)
        .map(|i| -> Result<Sample> {
            let label = (i % 2) as u32;
            let magnitude = 1.0 + (i % 5) as f32 * 0.1;
            let value = if label == 1 { magnitude } else { -magnitude };
            Ok(Sample::new(
                Tensor::full(value, (1, 2, 2), device)?,
                Tensor::new(label, device)?,
            ))
        })
        .collect()
}

#[tokio::test]
async fn test_classifier_learns_and_persists() -> Result<()> {
    let device = Device::Cpu;
    let temp_dir = TempDir::new()?;
    let model_path = temp_dir.path().join("models").join("classifier.safetensors");

    let mut dataset = ImageDataset::new(
        InMemoryLoader::new(separable_samples(64, &device)?).shuffled(42),
    )
    .with_validation(InMemoryLoader::new(separable_samples(16, &device)?));

    let config = ClassifierConfig::new(4, 2)
        .with_hidden_dim(16)
        .with_learning_rate(0.01);
    let classifier = ImageClassifier::new(config.clone(), &device)?;

    let args = TrainArgs::new(&model_path).with_epochs(5).with_batch_size(8);
    let (sink, mut rx) = ChannelSink::channel();
    let driver = TrainingDriver::new(args)?.with_sink(sink);

    let trained = driver
        .run(&mut dataset, UniModel::new(classifier, "synthetic".to_string()))
        .await?;
    drop(driver);

    assert_eq!(trained.metadata, "synthetic");
    assert_eq!(trained.model.step(), 5 * 8);

    let mut validation_losses = Vec::new();
    let mut saved_uri = None;
    while let Some(event) = rx.recv().await {
        match event {
            TrainingEvent::ValidationCompleted { summary, .. } => {
                assert_eq!(summary.batches, 2);
                validation_losses.push(summary.loss);
            }
            TrainingEvent::ModelSaved { uri } => saved_uri = Some(uri),
            _ => {}
        }
    }

    assert_eq!(validation_losses.len(), 5);
    let first = validation_losses[0];
    let last = validation_losses[4];
    println!("Validation loss: {} -> {}", first, last);
    assert!(last <= first, "Validation loss increased: {} -> {}", first, last);
    assert!(
        last < std::f64::consts::LN_2,
        "Validation loss still at chance level: {}",
        last
    );

    assert_eq!(
        saved_uri,
        Some(format!("file://{}", model_path.display()))
    );
    assert!(model_exists(&model_path));

    let reloaded = ImageClassifier::load(&model_path, &device)?;
    assert_eq!(reloaded.config(), &config);
    assert_eq!(reloaded.step(), 40);

    let probe = Tensor::stack(
        &[
            Tensor::full(-1.2f32, (1, 2, 2), &device)?,
            Tensor::full(1.3f32, (1, 2, 2), &device)?,
        ],
        0,
    )?;
    assert_eq!(
        trained.model.predict(&probe)?.to_vec1::<u32>()?,
        reloaded.predict(&probe)?.to_vec1::<u32>()?
    );

    Ok(())
}

#[tokio::test]
async fn test_save_overwrites_existing_model() -> Result<()> {
    let device = Device::Cpu;
    let temp_dir = TempDir::new()?;
    let model_path = temp_dir.path().join("classifier.safetensors");
    std::fs::write(&model_path, "stale")?;

    let mut dataset = ImageDataset::new(InMemoryLoader::new(separable_samples(8, &device)?));
    let classifier = ImageClassifier::new(ClassifierConfig::new(4, 2), &device)?;
    let args = TrainArgs::new(&model_path).with_epochs(1).with_batch_size(4);

    classifier_trainer::train(&mut dataset, UniModel::new(classifier, ()), &args).await?;

    let reloaded = ImageClassifier::load(&model_path, &device)?;
    assert_eq!(reloaded.step(), 2);
    Ok(())
}

#[tokio::test]
async fn test_shape_mismatch_aborts_training() -> Result<()> {
    let device = Device::Cpu;
    let temp_dir = TempDir::new()?;
    let model_path = temp_dir.path().join("classifier.safetensors");

    let mut dataset = ImageDataset::new(InMemoryLoader::new(separable_samples(8, &device)?));
    // Images have 4 features, the classifier expects 9
    let classifier = ImageClassifier::new(ClassifierConfig::new(9, 2), &device)?;
    let args = TrainArgs::new(&model_path).with_epochs(1).with_batch_size(4);
    let driver = TrainingDriver::new(args)?;
    let ledger = driver.ledger();

    let result = driver.run(&mut dataset, UniModel::new(classifier, ())).await;

    assert!(result.is_err());
    assert_eq!(ledger.outstanding(), 0);
    assert!(!model_exists(&model_path));
    Ok(())
}
