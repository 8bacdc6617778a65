pub mod model_resolver;
pub mod onnx_face_detector;
pub mod onnx_hand_detector;
pub mod replay_detectors;
pub mod skip_frame_detector;
